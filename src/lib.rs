// Trellis - declarative registration for controllers, services and plugins
//
// Components are registered under roles, routes and injectable fields are
// recorded as metadata, and a host framework reads the resulting route
// tables, injection edges and middleware descriptors at bootstrap.

// Re-export core functionality
pub use trellis_core::*;

// Re-export procedural macros
pub use trellis_macro::handler;

#[cfg(feature = "config")]
pub use trellis_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ConfigDescriptor,
        Error,
        HttpMethod,
        InjectionEdges,
        MethodRef,
        Middleware,
        MiddlewareDescriptor,
        Registry,
        Resolver,
        Role,
        RouteTable,
        RoutingTable,
        TypeKey,
        declare_field,
        declare_route,
        handler,
    };
}
