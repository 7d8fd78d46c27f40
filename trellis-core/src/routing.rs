// Route tables: per-controller descriptors and the resolved dispatch table

use crate::logging::{debug, trace, warn};
use crate::params::{MethodRef, extract_parameter_names};
use crate::{HttpMethod, MetadataKey, MetadataStore, MethodKey, Subject, TypeKey};
use serde::Serialize;
use std::collections::HashMap;

/// Path used when a controller or a route supplies none
pub const DEFAULT_PATH: &str = "/";

/// One endpoint of a controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub verb: HttpMethod,
    pub path: String,
    pub parameter_names: Vec<String>,
}

impl Default for RouteDescriptor {
    fn default() -> Self {
        Self {
            verb: HttpMethod::GET,
            path: DEFAULT_PATH.to_string(),
            parameter_names: Vec::new(),
        }
    }
}

/// Route descriptors of one controller, keyed by method identity.
///
/// Iteration follows commit order. An entry, once committed, is never
/// replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    order: Vec<MethodKey>,
    entries: HashMap<MethodKey, RouteDescriptor>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: &MethodKey) -> Option<&RouteDescriptor> {
        self.entries.get(method)
    }

    pub fn contains(&self, method: &MethodKey) -> bool {
        self.entries.contains_key(method)
    }

    /// Commit a descriptor unless the method already has one.
    ///
    /// Returns whether the descriptor was committed.
    pub fn insert_if_absent(&mut self, method: MethodKey, descriptor: RouteDescriptor) -> bool {
        if self.entries.contains_key(&method) {
            return false;
        }
        self.order.push(method);
        self.entries.insert(method, descriptor);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &RouteDescriptor)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|descriptor| (key, descriptor)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Normalise a caller-supplied path, treating absent or empty as `/`
pub fn path_or_default(path: Option<&str>) -> String {
    match path {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => DEFAULT_PATH.to_string(),
    }
}

/// Join a controller base path and a route path at a single `/`.
///
/// Only the seam is normalised; the rest of both strings is kept as is.
pub fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    match (base.is_empty(), path.is_empty()) {
        (true, true) => DEFAULT_PATH.to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => {
            if base.starts_with('/') {
                base.to_string()
            } else {
                format!("/{}", base)
            }
        }
        (false, false) => {
            if base.starts_with('/') {
                format!("{}/{}", base, path)
            } else {
                format!("/{}/{}", base, path)
            }
        }
    }
}

/// Record a route for `method` on `controller`.
///
/// The working descriptor always receives the given verb, path and the
/// method's parameter names, but it is only committed when the controller
/// has no route for this method yet: the first registration wins.
/// Returns whether the route was committed.
pub fn register_route(
    store: &MetadataStore,
    controller: TypeKey,
    method: &MethodRef,
    verb: HttpMethod,
    path: Option<&str>,
) -> bool {
    let key = method.key();
    let path = path_or_default(path);
    let parameter_names = extract_parameter_names(method);

    store.update(
        Subject::Type(controller),
        MetadataKey::Routes,
        RouteTable::new,
        |table: &mut RouteTable| {
            let mut working = table.get(&key).cloned().unwrap_or_default();
            working.verb = verb;
            working.path = path;
            working.parameter_names = parameter_names;

            if let Some(existing) = table.get(&key) {
                if *existing == working {
                    trace!(controller = %controller, method = %key, "Route re-registered unchanged");
                } else {
                    warn!(
                        controller = %controller,
                        method = %key,
                        kept_verb = %existing.verb,
                        kept_path = %existing.path,
                        ignored_verb = %working.verb,
                        ignored_path = %working.path,
                        "Method already routed, keeping first registration"
                    );
                }
                return false;
            }

            debug!(
                controller = %controller,
                method = %key,
                verb = %working.verb,
                path = %working.path,
                "Route registered"
            );
            table.insert_if_absent(key, working)
        },
    )
}

/// Route table of a controller; empty if it has none
pub fn get_routes(store: &MetadataStore, controller: TypeKey) -> RouteTable {
    store
        .get::<RouteTable>(&Subject::Type(controller), &MetadataKey::Routes)
        .unwrap_or_default()
}

/// A committed route with its controller prefix applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub verb: HttpMethod,
    /// Base path joined with the route path
    pub path: String,
    pub controller: TypeKey,
    pub handler: MethodKey,
    pub parameter_names: Vec<String>,
}

/// Dispatch table handed to the HTTP transport
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoutingTable {
    routes: Vec<ResolvedRoute>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every route of one controller under its base path
    pub fn add_controller(&mut self, controller: TypeKey, base_path: &str, table: &RouteTable) {
        for (method, descriptor) in table.iter() {
            self.routes.push(ResolvedRoute {
                verb: descriptor.verb,
                path: join_paths(base_path, &descriptor.path),
                controller,
                handler: *method,
                parameter_names: descriptor.parameter_names.clone(),
            });
        }
    }

    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    /// First route serving `verb` at exactly `path`
    pub fn find(&self, verb: &str, path: &str) -> Option<&ResolvedRoute> {
        self.routes
            .iter()
            .find(|route| route.path == path && route.verb.accepts(verb))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/", "/"), "/");
        assert_eq!(join_paths("/users", "/"), "/users");
        assert_eq!(join_paths("/", "/list"), "/list");
        assert_eq!(join_paths("/users/", "/list"), "/users/list");
        assert_eq!(join_paths("users", "list"), "/users/list");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("/api", ":id"), "/api/:id");
    }

    #[test]
    fn test_path_or_default() {
        assert_eq!(path_or_default(None), "/");
        assert_eq!(path_or_default(Some("")), "/");
        assert_eq!(path_or_default(Some("/a")), "/a");
    }

    #[test]
    fn test_route_table_keeps_first_commit() {
        let mut table = RouteTable::new();
        let key = MethodKey::of::<Users>("list");
        let first = RouteDescriptor {
            verb: HttpMethod::GET,
            path: "/a".into(),
            parameter_names: vec![],
        };
        let second = RouteDescriptor {
            verb: HttpMethod::POST,
            path: "/b".into(),
            parameter_names: vec![],
        };

        assert!(table.insert_if_absent(key, first.clone()));
        assert!(!table.insert_if_absent(key, second));
        assert_eq!(table.get(&key), Some(&first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_register_route_first_wins() {
        let store = MetadataStore::new();
        let controller = TypeKey::of::<Users>();
        let method = MethodRef::with_params::<Users>("list", &["req"]);

        assert!(register_route(&store, controller, &method, HttpMethod::GET, Some("/a")));
        assert!(!register_route(&store, controller, &method, HttpMethod::POST, Some("/b")));

        let routes = get_routes(&store, controller);
        let descriptor = routes.get(&method.key()).unwrap();
        assert_eq!(descriptor.verb, HttpMethod::GET);
        assert_eq!(descriptor.path, "/a");
        assert_eq!(descriptor.parameter_names, vec!["req"]);
    }

    #[test]
    fn test_routing_table_find() {
        let mut routes = RouteTable::new();
        routes.insert_if_absent(
            MethodKey::of::<Users>("any"),
            RouteDescriptor {
                verb: HttpMethod::ANY,
                path: "/ping".into(),
                parameter_names: vec![],
            },
        );

        let mut table = RoutingTable::new();
        table.add_controller(TypeKey::of::<Users>(), "/users", &routes);

        assert_eq!(table.find("PUT", "/users/ping").unwrap().handler.name, "any");
        assert!(table.find("GET", "/ping").is_none());
    }
}
