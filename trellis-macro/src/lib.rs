// Procedural macros for the Trellis registration layer

use proc_macro::TokenStream;

mod handler;

/// Records a method's parameter names from its compiled signature.
///
/// Apply to a method inside an inherent `impl` block. The method is left
/// unchanged and a sibling associated function `__handler_<name>()` is
/// generated, returning a `trellis_core::MethodRef` for the method.
///
/// ```rust,ignore
/// impl UserController {
///     #[handler]
///     pub fn show(&self, id: u64, verbose: bool) -> String { ... }
/// }
///
/// let show = UserController::__handler_show();
/// registry.register_route(TypeKey::of::<UserController>(), &show, HttpMethod::GET, Some("/:id"));
/// ```
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    handler::handler_impl(attr, item)
}
