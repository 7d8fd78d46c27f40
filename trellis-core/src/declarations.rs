//! Declarations collected at compile time using inventory
//!
//! `declare_route!` and `declare_field!` can sit next to the code they
//! describe. Nothing is applied until bootstrap calls
//! [`Registry::apply_declarations`], which marks every declared field
//! before registering any route.

use crate::logging::debug;
use crate::params::{MethodRef, Signature};
use crate::{HttpMethod, MethodKey, Registry, TypeKey};
use std::any::TypeId;
use std::borrow::Cow;

/// A route submitted with `declare_route!`
pub struct RouteDeclaration {
    /// Controller the route belongs to
    pub controller: fn() -> TypeKey,
    pub verb: HttpMethod,
    /// Route path; empty means `/`
    pub path: &'static str,
    pub method_name: &'static str,
    /// Signature source text of the handler
    pub signature: &'static str,
}

inventory::collect!(RouteDeclaration);

impl RouteDeclaration {
    pub fn method_ref(&self) -> MethodRef {
        MethodRef::new(
            MethodKey::new((self.controller)(), self.method_name),
            Signature::Text(Cow::Borrowed(self.signature)),
        )
    }
}

/// An injectable field submitted with `declare_field!`
pub struct FieldDeclaration {
    pub owner: fn() -> TypeKey,
    pub field: &'static str,
    pub declared: fn() -> TypeKey,
}

inventory::collect!(FieldDeclaration);

/// Every route declared for controller `C`
pub fn route_declarations_for<C: 'static>() -> Vec<&'static RouteDeclaration> {
    let target = TypeId::of::<C>();
    inventory::iter::<RouteDeclaration>
        .into_iter()
        .filter(|declaration| (declaration.controller)().id() == target)
        .collect()
}

/// Every field declared on `T`
pub fn field_declarations_for<T: 'static>() -> Vec<&'static FieldDeclaration> {
    let target = TypeId::of::<T>();
    inventory::iter::<FieldDeclaration>
        .into_iter()
        .filter(|declaration| (declaration.owner)().id() == target)
        .collect()
}

impl Registry {
    /// Apply every collected declaration: fields first, then routes.
    ///
    /// Returns the number of routes committed.
    pub fn apply_declarations(&self) -> usize {
        let mut fields = 0;
        for declaration in inventory::iter::<FieldDeclaration> {
            self.mark_field((declaration.owner)(), declaration.field, (declaration.declared)());
            fields += 1;
        }

        let mut committed = 0;
        for declaration in inventory::iter::<RouteDeclaration> {
            let path = Some(declaration.path).filter(|path| !path.is_empty());
            if self.register_route(
                (declaration.controller)(),
                &declaration.method_ref(),
                declaration.verb,
                path,
            ) {
                committed += 1;
            }
        }

        debug!(fields, routes = committed, "Applied collected declarations");
        committed
    }
}

/// Declare a route for later application by `Registry::apply_declarations`.
///
/// ```ignore
/// declare_route!(UserController, GET, "/:id", show, "fn show(&self, req, res)");
/// ```
#[macro_export]
macro_rules! declare_route {
    ($controller:ty, $verb:ident, $path:expr, $method:ident, $signature:expr) => {
        $crate::inventory::submit! {
            $crate::declarations::RouteDeclaration {
                controller: $crate::TypeKey::of::<$controller>,
                verb: $crate::HttpMethod::$verb,
                path: $path,
                method_name: stringify!($method),
                signature: $signature,
            }
        }
    };
}

/// Declare an injectable field for later application.
///
/// ```ignore
/// declare_field!(UserController, repo: UserRepository);
/// ```
#[macro_export]
macro_rules! declare_field {
    ($owner:ty, $field:ident : $declared:ty) => {
        $crate::inventory::submit! {
            $crate::declarations::FieldDeclaration {
                owner: $crate::TypeKey::of::<$owner>,
                field: stringify!($field),
                declared: $crate::TypeKey::of::<$declared>,
            }
        }
    };
}
