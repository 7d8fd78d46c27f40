// Tests for compile-time declarations

use trellis_core::{
    HttpMethod, MethodKey, Registry, TypeKey, declare_field, declare_route,
    route_declarations_for, field_declarations_for,
};

struct OrderController;
struct OrderRepository;

declare_field!(OrderController, repo: OrderRepository);
declare_route!(OrderController, GET, "", list, "fn list(&self, req)");
declare_route!(OrderController, POST, "/:id/cancel", cancel, "fn cancel(&self, req, id)");
declare_route!(OrderController, DELETE, "/other", cancel, "fn cancel(&self, req, id)");

#[test]
fn test_declarations_are_collected() {
    assert_eq!(route_declarations_for::<OrderController>().len(), 3);
    assert_eq!(field_declarations_for::<OrderController>().len(), 1);
    assert!(route_declarations_for::<OrderRepository>().is_empty());
}

#[test]
fn test_apply_declarations() {
    let registry = Registry::new();
    let controller = TypeKey::of::<OrderController>();

    // The second declaration for `cancel` loses to whichever was applied first
    assert_eq!(registry.apply_declarations(), 2);
    registry.register_service(TypeKey::of::<OrderRepository>());
    registry.register_controller(controller, Some("/orders"));

    let routes = registry.get_routes(controller);
    let list = routes.get(&MethodKey::of::<OrderController>("list")).unwrap();
    assert_eq!(list.path, "/");
    assert_eq!(list.verb, HttpMethod::GET);
    assert_eq!(list.parameter_names, vec!["&self", "req"]);
    assert!(routes.contains(&MethodKey::of::<OrderController>("cancel")));

    assert_eq!(
        registry.dependency_graph().node(controller).unwrap().edges.get("repo"),
        Some(TypeKey::of::<OrderRepository>())
    );
    assert!(registry.verify_dependencies().is_ok());
}
