//! Derive macros for gill.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive `gill_core::Merge` for a config struct with named fields.
///
/// Each field is merged with its counterpart, so every field type must
/// implement `Merge` itself (usually an `Option<T>` or a nested section).
///
/// ```ignore
/// use gill_core::Merge;
///
/// #[derive(Merge)]
/// struct LintConfig {
///     on_save: Option<bool>,
///     debounce_ms: Option<u64>,
/// }
/// ```
#[proc_macro_derive(Merge)]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Merge can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Merge can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let merged = fields.iter().map(|f| {
        let field = &f.ident;
        quote! {
            #field: ::gill_core::Merge::merge(self.#field, other.#field)
        }
    });

    let expanded = quote! {
        impl #impl_generics ::gill_core::Merge for #name #ty_generics #where_clause {
            fn merge(self, other: Self) -> Self {
                Self {
                    #(#merged),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}
