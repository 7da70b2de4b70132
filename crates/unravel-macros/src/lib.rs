//! Procedural macros for unravel.

use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive `unravel::Target` (and record field access) for a named-field
/// struct.
///
/// Field attributes carry record tag strings verbatim, for the runtime
/// resolver to parse:
///
/// ```ignore
/// #[derive(Default, unravel::Target)]
/// struct Params {
///     #[qry("keyA")]
///     first: String,
///     #[qry(",embed")]
///     extra: Extra,
///     #[qry_set("valueList=allowLiteral")]
///     raw: String,
///     #[qry("-")]
///     skipped: u64,
/// }
/// ```
#[proc_macro_derive(Target, attributes(qry, qry_set))]
pub fn derive_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "Target can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.span(),
            "Target requires named fields",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Target cannot be derived for generic structs",
        ));
    }

    let ident = &input.ident;

    let mut infos = Vec::new();
    let mut idents = Vec::new();
    let mut indices = Vec::new();

    for (index, field) in fields.named.iter().enumerate() {
        let field_ident = field.ident.as_ref().expect("named field has an ident");
        let name = field_ident.to_string();
        let ty = &field.ty;

        let mut tags = Vec::new();
        for attr in &field.attrs {
            if attr.path().is_ident("qry") {
                let value: LitStr = attr.parse_args()?;
                tags.push(quote! { ("qry", #value) });
            } else if attr.path().is_ident("qry_set") {
                let value: LitStr = attr.parse_args()?;
                tags.push(quote! { ("qrySet", #value) });
            }
        }

        infos.push(quote! {
            ::unravel::FieldInfo {
                name: #name,
                exported: true,
                anonymous: false,
                tags: &[#(#tags),*],
                ty: <#ty as ::unravel::Target>::meta,
            }
        });
        idents.push(field_ident.clone());
        indices.push(index);
    }

    let vacant = if idents.is_empty() {
        quote! { true }
    } else {
        quote! { #(::unravel::Target::is_vacant(&self.#idents))&&* }
    };

    Ok(quote! {
        const _: () = {
            fn __unravel_record_meta() -> ::unravel::RecordMeta {
                static FIELDS: &[::unravel::FieldInfo] = &[#(#infos),*];
                ::unravel::RecordMeta {
                    type_name: ::std::any::type_name::<#ident>(),
                    type_id: ::std::any::TypeId::of::<#ident>(),
                    fields: FIELDS,
                }
            }

            #[automatically_derived]
            impl ::unravel::Target for #ident {
                fn meta() -> ::unravel::TypeMeta {
                    ::unravel::TypeMeta::record::<#ident>(__unravel_record_meta)
                }

                fn dyn_meta(&self) -> ::unravel::TypeMeta {
                    <#ident as ::unravel::Target>::meta()
                }

                fn is_vacant(&self) -> bool {
                    #vacant
                }

                fn shape(&mut self) -> ::unravel::Shape<'_> {
                    ::unravel::Shape::Record(self)
                }
            }

            #[automatically_derived]
            impl ::unravel::RecordTarget for #ident {
                fn record_meta(&self) -> ::unravel::RecordMeta {
                    __unravel_record_meta()
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn ::unravel::Target> {
                    match index {
                        #(#indices => ::core::option::Option::Some(&mut self.#idents),)*
                        _ => ::core::option::Option::None,
                    }
                }

                fn reset(&mut self) {
                    #(self.#idents = ::core::default::Default::default();)*
                }
            }
        };
    })
}
