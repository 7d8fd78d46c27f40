// Core library for the Trellis registration layer
// Metadata store, route tables, role registration and injection edges

pub mod declarations;
pub mod error;
pub mod injection;
pub mod logging;
pub mod metadata;
pub mod params;
pub mod registration;
pub mod registry;
pub mod routing;
pub mod subject;
pub mod traits;

// Used by declare_route! and declare_field!
#[doc(hidden)]
pub use inventory;

pub use declarations::{RouteDeclaration, FieldDeclaration, route_declarations_for, field_declarations_for};
pub use error::*;
pub use injection::{DependencyGraph, DependencyNode, InjectionEdge, InjectionEdges};
pub use metadata::{MetadataKey, MetadataStore};
pub use params::{MethodRef, Signature, extract_parameter_names, parse_signature_text};
pub use registration::{RegistrationSet, Role, RoleSets};
pub use registry::*;
pub use routing::{ResolvedRoute, RouteDescriptor, RouteTable, RoutingTable, join_paths};
pub use subject::*;
pub use traits::*;
