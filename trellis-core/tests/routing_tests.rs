// Tests for route tables and the resolved dispatch table

use trellis_core::{HttpMethod, MethodKey, MethodRef, Registry, TypeKey};

struct UserController;
struct HealthController;

fn list() -> MethodRef {
    MethodRef::with_signature::<UserController>("list", "fn list(req, res, next)")
}

#[test]
fn test_first_registration_wins() {
    let registry = Registry::new();
    let controller = TypeKey::of::<UserController>();

    assert!(registry.register_route(controller, &list(), HttpMethod::GET, Some("/a")));
    assert!(!registry.register_route(controller, &list(), HttpMethod::POST, Some("/b")));

    let routes = registry.get_routes(controller);
    let descriptor = routes.get(&list().key()).unwrap();
    assert_eq!(descriptor.verb, HttpMethod::GET);
    assert_eq!(descriptor.path, "/a");
    assert_eq!(routes.len(), 1);
}

#[test]
fn test_same_route_twice_is_idempotent() {
    let registry = Registry::new();
    let controller = TypeKey::of::<UserController>();

    registry.register_route(controller, &list(), HttpMethod::PUT, Some("/x"));
    registry.register_route(controller, &list(), HttpMethod::PUT, Some("/x"));

    let routes = registry.get_routes(controller);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes.get(&list().key()).unwrap().verb, HttpMethod::PUT);
}

#[test]
fn test_parameter_names_recorded() {
    let registry = Registry::new();
    let controller = TypeKey::of::<UserController>();
    let index = MethodRef::with_signature::<UserController>("index", "fn index()");

    registry.register_route(controller, &list(), HttpMethod::GET, None);
    registry.register_route(controller, &index, HttpMethod::GET, Some("/index"));

    let routes = registry.get_routes(controller);
    assert_eq!(
        routes.get(&list().key()).unwrap().parameter_names,
        vec!["req", "res", "next"]
    );
    assert!(routes.get(&index.key()).unwrap().parameter_names.is_empty());
}

#[test]
fn test_default_paths_at_both_levels() {
    let registry = Registry::new();
    let controller = TypeKey::of::<HealthController>();
    let check = MethodRef::with_params::<HealthController>("check", &[]);

    registry.register_route(controller, &check, HttpMethod::GET, None);
    registry.register_controller(controller, None);

    assert_eq!(registry.get_base_path(controller).as_deref(), Some("/"));
    assert_eq!(registry.get_routes(controller).get(&check.key()).unwrap().path, "/");

    let table = registry.routing_table();
    assert_eq!(table.routes()[0].path, "/");
}

#[test]
fn test_route_tables_not_shared() {
    let registry = Registry::new();
    let users = TypeKey::of::<UserController>();
    let health = TypeKey::of::<HealthController>();

    registry.register_route(users, &list(), HttpMethod::GET, Some("/"));

    assert_eq!(registry.get_routes(users).len(), 1);
    assert!(registry.get_routes(health).is_empty());
}

#[test]
fn test_routes_iterate_in_commit_order() {
    let registry = Registry::new();
    let controller = TypeKey::of::<UserController>();

    for name in ["create", "list", "delete"] {
        let method = MethodRef::with_params::<UserController>(name, &[]);
        registry.register_route(controller, &method, HttpMethod::ANY, Some(name));
    }

    let names: Vec<_> = registry
        .get_routes(controller)
        .iter()
        .map(|(method, _)| method.name)
        .collect();
    assert_eq!(names, vec!["create", "list", "delete"]);
}

#[test]
fn test_routing_table_joins_base_paths() {
    let registry = Registry::new();
    let users = TypeKey::of::<UserController>();
    let health = TypeKey::of::<HealthController>();
    let show = MethodRef::with_signature::<UserController>("show", "fn show(id)");
    let check = MethodRef::with_params::<HealthController>("check", &[]);

    registry.register_route(users, &list(), HttpMethod::GET, Some("/"));
    registry.register_route(users, &show, HttpMethod::GET, Some("/:id"));
    registry.register_route(health, &check, HttpMethod::ANY, Some("/health"));
    registry.register_controller(users, Some("/users"));
    registry.register_controller(health, None);

    let table = registry.routing_table();
    let paths: Vec<_> = table.routes().iter().map(|route| route.path.as_str()).collect();
    assert_eq!(paths, vec!["/users", "/users/:id", "/health"]);

    let route = table.find("get", "/users/:id").unwrap();
    assert_eq!(route.handler, MethodKey::of::<UserController>("show"));
    assert_eq!(route.parameter_names, vec!["id"]);
    assert_eq!(table.find("DELETE", "/health").unwrap().controller, health);
}

#[test]
fn test_routing_table_skips_unregistered_controllers() {
    let registry = Registry::new();
    registry.register_route(TypeKey::of::<UserController>(), &list(), HttpMethod::GET, None);

    assert!(registry.routing_table().is_empty());
}

#[test]
fn test_routing_table_json() {
    let registry = Registry::new();
    let users = TypeKey::of::<UserController>();

    registry.register_route(users, &list(), HttpMethod::POST, Some("/bulk"));
    registry.register_controller(users, Some("/users"));

    let json = registry.routing_table().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["verb"], "POST");
    assert_eq!(value[0]["path"], "/users/bulk");
    assert_eq!(value[0]["handler"]["name"], "list");
    assert_eq!(value[0]["parameter_names"][2], "next");
}
