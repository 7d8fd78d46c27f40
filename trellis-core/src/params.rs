//! Parameter name extraction for route handlers.
//!
//! Handlers reach the registry as a [`MethodRef`]. When the method was
//! annotated with `#[handler]` the parameter names come straight from the
//! compiled signature. Otherwise the caller supplies the signature text
//! and the names are recovered with a syntactic heuristic:
//!
//! 1. `//` line comments and `/* */` block comments are removed.
//! 2. The text between the first `(` and the first `)` after it is taken.
//! 3. Every run of characters that is neither whitespace nor `,` is one
//!    parameter name.
//!
//! The heuristic is not a parser. Destructuring patterns, type
//! annotations and default values come back as fragments
//! (`{ id, name }` yields `["{", "id", "name", "}"]`), and text with no
//! parentheses yields an empty list.

use crate::logging::warn;
use crate::{MethodKey, TypeKey};
use std::borrow::Cow;

/// Where a handler's parameter names come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    /// Names taken from the compiled signature
    Compiled(&'static [&'static str]),
    /// Signature source text, parsed heuristically
    Text(Cow<'static, str>),
}

/// A handler method together with its signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    key: MethodKey,
    signature: Signature,
}

impl MethodRef {
    pub fn new(key: MethodKey, signature: Signature) -> Self {
        Self { key, signature }
    }

    /// Method `name` on `T` with parameter names known at compile time
    pub fn with_params<T: ?Sized + 'static>(
        name: &'static str,
        params: &'static [&'static str],
    ) -> Self {
        Self::new(MethodKey::of::<T>(name), Signature::Compiled(params))
    }

    /// Method `name` on `T` described by its signature text
    pub fn with_signature<T: ?Sized + 'static>(
        name: &'static str,
        signature: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(MethodKey::of::<T>(name), Signature::Text(signature.into()))
    }

    pub fn key(&self) -> MethodKey {
        self.key
    }

    pub fn owner(&self) -> TypeKey {
        self.key.owner
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Declared parameter names of a handler, in source order.
///
/// Never fails; unparseable signature text yields an empty list.
pub fn extract_parameter_names(handler: &MethodRef) -> Vec<String> {
    match &handler.signature {
        Signature::Compiled(names) => names.iter().map(|name| name.to_string()).collect(),
        Signature::Text(text) => parenthesized_tokens(text).unwrap_or_else(|| {
            warn!(handler = %handler.key, "No parameter list found in signature text");
            Vec::new()
        }),
    }
}

/// The textual heuristic on its own
pub fn parse_signature_text(text: &str) -> Vec<String> {
    parenthesized_tokens(text).unwrap_or_default()
}

fn parenthesized_tokens(text: &str) -> Option<Vec<String>> {
    let stripped = strip_comments(text);

    let open = stripped.find('(')?;
    let rest = &stripped[open + 1..];
    let close = rest.find(')')?;

    Some(
        rest[..close]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        let start = match (line, block) {
            (Some(l), Some(b)) => l.min(b),
            (Some(l), None) => l,
            (None, Some(b)) => b,
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        };

        out.push_str(&rest[..start]);
        let comment = &rest[start..];
        if comment.starts_with("//") {
            match comment.find('\n') {
                Some(end) => rest = &comment[end..],
                None => return out,
            }
        } else {
            match comment[2..].find("*/") {
                Some(end) => rest = &comment[2 + end + 2..],
                // Unterminated block comment swallows the remainder
                None => return out,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    fn names(text: &str) -> Vec<String> {
        parse_signature_text(text)
    }

    #[test]
    fn test_simple_parameters() {
        assert_eq!(names("fn handle(req, res, next)"), vec!["req", "res", "next"]);
    }

    #[test]
    fn test_no_parameters() {
        assert!(names("fn index()").is_empty());
    }

    #[test]
    fn test_no_parentheses() {
        assert!(names("handler").is_empty());
        assert!(names("fn broken(req").is_empty());
    }

    #[test]
    fn test_comments_stripped() {
        assert_eq!(
            names("fn show(/* the request */ req, // trailing\n id)"),
            vec!["req", "id"]
        );
        assert_eq!(names("// fn old(a, b)\nfn new(c)"), vec!["c"]);
    }

    #[test]
    fn test_default_values_fragment() {
        assert_eq!(names("(page = 1, size)"), vec!["page", "=", "1", "size"]);
    }

    #[test]
    fn test_destructuring_fragments() {
        assert_eq!(names("({ id, name }, res)"), vec!["{", "id", "name", "}", "res"]);
    }

    #[test]
    fn test_compiled_signature_used_verbatim() {
        let method = MethodRef::with_params::<Users>("list", &["req", "res"]);
        assert_eq!(extract_parameter_names(&method), vec!["req", "res"]);
    }

    #[test]
    fn test_text_signature_through_method_ref() {
        let method = MethodRef::with_signature::<Users>("show", "fn show(&self, id: u64)");
        assert_eq!(extract_parameter_names(&method), vec!["&self", "id:", "u64"]);
        assert_eq!(method.name(), "show");
        assert_eq!(method.owner(), TypeKey::of::<Users>());
    }
}
