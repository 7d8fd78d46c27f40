// Core traits and shared vocabulary for the Trellis registration layer

use crate::Error;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP verbs a route can be registered under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    /// Matches every verb
    ANY,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::OPTIONS,
        HttpMethod::ANY,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::ANY => "ANY",
        }
    }

    /// Whether a request with the given verb is served by this route verb
    pub fn accepts(&self, verb: &str) -> bool {
        *self == HttpMethod::ANY || self.as_str().eq_ignore_ascii_case(verb)
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "ANY" | "ALL" => Ok(HttpMethod::ANY),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-erased handle to a middleware's resolve capability.
///
/// The registry never invokes it; the external chain builder downcasts it
/// back to the callable type it expects.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Resolver {
    pub fn new<F: Any + Send + Sync>(resolve: F) -> Self {
        Self {
            inner: Arc::new(resolve),
            type_name: std::any::type_name::<F>(),
        }
    }

    pub fn downcast_ref<F: Any>(&self) -> Option<&F> {
        self.inner.downcast_ref::<F>()
    }

    /// Name of the wrapped callable type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles wrap the same allocation
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Trait for middleware components.
///
/// Registration instantiates the middleware and asks it for its resolve
/// capability; a middleware that returns `None` is rejected with a
/// contract violation.
pub trait Middleware: Send + Sync + 'static {
    /// The callable the middleware chain runs for this middleware
    fn resolve(&self) -> Option<Resolver>;
}
