use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ImplItemFn, LitStr, Pat, parse_macro_input};

/// Name recorded for one parameter pattern
fn parameter_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
        Pat::Reference(reference) => parameter_name(&reference.pat),
        Pat::Type(typed) => parameter_name(&typed.pat),
        // Destructuring and wildcards keep their source text
        other => quote!(#other).to_string(),
    }
}

pub fn handler_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "#[handler] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ImplItemFn);
    let func_name = &input.sig.ident;
    let func_name_value = LitStr::new(&func_name.to_string(), func_name.span());
    let accessor = format_ident!("__handler_{}", func_name);

    let names: Vec<LitStr> = input
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat_type) => Some(LitStr::new(
                &parameter_name(&pat_type.pat),
                proc_macro2::Span::call_site(),
            )),
        })
        .collect();

    let expanded = quote! {
        #input

        #[doc(hidden)]
        #[allow(dead_code)]
        pub fn #accessor() -> ::trellis_core::MethodRef {
            ::trellis_core::MethodRef::with_params::<Self>(#func_name_value, &[#(#names),*])
        }
    };

    TokenStream::from(expanded)
}
