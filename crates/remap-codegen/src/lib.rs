// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// `#[derive(Remap)]` macro: generates the `Convertible` impl carrying a
/// type's shape table.
///
/// Supports:
/// - Structs with named fields: a property-binding table (name, optional
///   rename, field type, getter, setter) per field. Requires `Default`
///   and `Clone`.
/// - Fieldless enums: a variant-name table with constructor and name
///   accessor. Requires `Clone`.
///
/// Field attributes:
/// - `#[remap(rename = "Other")]` - resolve this property under a
///   different name during structural copying.
///
/// # Example
/// ```ignore
/// use remap::Remap;
///
/// #[derive(Remap, Default, Clone)]
/// struct Order {
///     id: u64,
///     #[remap(rename = "customer_name")]
///     customer: String,
/// }
/// ```
#[proc_macro_derive(Remap, attributes(remap))]
pub fn derive_remap(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match remap_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn remap_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Remap does not support generic types",
        ));
    }

    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => struct_impl(name, &fields.named),
            _ => Err(syn::Error::new_spanned(
                name,
                "Remap structs require named fields",
            )),
        },
        Data::Enum(data) => enum_impl(name, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            name,
            "Remap supports structs and fieldless enums only",
        )),
    }
}

fn struct_impl(
    name: &syn::Ident,
    fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let type_name = name.to_string();

    let mut accessor_fns = Vec::new();
    let mut field_shapes = Vec::new();

    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name = field_ident.to_string();
        let field_ty = &field.ty;

        // Parse #[remap(rename = "...")].
        let mut rename: Option<String> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("remap") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    rename = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown remap attribute (expected `rename`)"))
                }
            })?;
        }

        let get_fn = format_ident!("__remap_get_{}", field_ident);
        let set_fn = format_ident!("__remap_set_{}", field_ident);

        accessor_fns.push(quote! {
            fn #get_fn(obj: &dyn ::remap::reflect::Convertible) -> ::remap::reflect::Value {
                match obj.as_any().downcast_ref::<#name>() {
                    ::core::option::Option::Some(value) => {
                        ::remap::reflect::Value::of(::core::clone::Clone::clone(&value.#field_ident))
                    }
                    ::core::option::Option::None => ::remap::reflect::Value::null(),
                }
            }

            fn #set_fn(obj: &mut dyn ::remap::reflect::Convertible, value: ::remap::reflect::Value) {
                if let ::core::option::Option::Some(target) = obj.as_any_mut().downcast_mut::<#name>() {
                    if let ::core::option::Option::Some(value) = value.take::<#field_ty>() {
                        target.#field_ident = value;
                    }
                }
            }
        });

        let rename_tokens = match &rename {
            Some(other) => {
                let lit = LitStr::new(other, Span::call_site());
                quote! { ::core::option::Option::Some(#lit) }
            }
            None => quote! { ::core::option::Option::None },
        };

        field_shapes.push(quote! {
            ::remap::reflect::FieldShape {
                name: #field_name,
                rename: #rename_tokens,
                ty: <#field_ty as ::remap::reflect::Convertible>::info,
                get: #get_fn,
                set: #set_fn,
            }
        });
    }

    Ok(quote! {
        impl ::remap::reflect::Convertible for #name {
            fn info() -> ::remap::reflect::TypeInfo {
                fn __remap_new_instance() -> ::remap::reflect::Value {
                    ::remap::reflect::Value::of(<#name as ::core::default::Default>::default())
                }

                #(#accessor_fns)*

                static __REMAP_FIELDS: &[::remap::reflect::FieldShape] = &[
                    #(#field_shapes),*
                ];

                ::remap::reflect::TypeInfo {
                    id: ::core::any::TypeId::of::<#name>(),
                    name: #type_name,
                    shape: ::remap::reflect::TypeShape::Struct(::remap::reflect::StructShape {
                        new_instance: __remap_new_instance,
                        fields: __REMAP_FIELDS,
                    }),
                }
            }

            fn type_info(&self) -> ::remap::reflect::TypeInfo {
                <Self as ::remap::reflect::Convertible>::info()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            fn clone_boxed(&self) -> ::std::boxed::Box<dyn ::remap::reflect::Convertible> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }
        }
    })
}

fn enum_impl(
    name: &syn::Ident,
    data: &syn::DataEnum,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let type_name = name.to_string();

    let mut variant_names = Vec::new();
    let mut construct_arms = Vec::new();
    let mut name_arms = Vec::new();

    for (index, variant) in data.variants.iter().enumerate() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Remap enums must be fieldless",
            ));
        }
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        variant_names.push(quote! { #variant_name });
        construct_arms.push(quote! {
            #index => ::remap::reflect::Value::of(#name::#variant_ident),
        });
        name_arms.push(quote! {
            ::core::option::Option::Some(#name::#variant_ident) => #variant_name,
        });
    }

    Ok(quote! {
        impl ::remap::reflect::Convertible for #name {
            fn info() -> ::remap::reflect::TypeInfo {
                fn __remap_construct(index: usize) -> ::remap::reflect::Value {
                    match index {
                        #(#construct_arms)*
                        _ => ::remap::reflect::Value::null(),
                    }
                }

                fn __remap_variant_name(obj: &dyn ::remap::reflect::Convertible) -> &'static str {
                    match obj.as_any().downcast_ref::<#name>() {
                        #(#name_arms)*
                        ::core::option::Option::None => "",
                    }
                }

                static __REMAP_VARIANTS: &[&str] = &[#(#variant_names),*];

                ::remap::reflect::TypeInfo {
                    id: ::core::any::TypeId::of::<#name>(),
                    name: #type_name,
                    shape: ::remap::reflect::TypeShape::Enum(::remap::reflect::EnumShape {
                        variants: __REMAP_VARIANTS,
                        construct: __remap_construct,
                        variant_name: __remap_variant_name,
                    }),
                }
            }

            fn type_info(&self) -> ::remap::reflect::TypeInfo {
                <Self as ::remap::reflect::Convertible>::info()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            fn clone_boxed(&self) -> ::std::boxed::Box<dyn ::remap::reflect::Convertible> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }
        }
    })
}

/// `#[derive(ConverterSet)]` macro: generates `ConverterSet::register_into`
/// forwarding every field marked `#[remap(converter)]` (of type
/// `Mapping<F, T>`) to the engine's registration entrypoint.
///
/// # Example
/// ```ignore
/// use remap::{ConverterSet, Mapping};
///
/// #[derive(ConverterSet)]
/// struct Converters {
///     #[remap(converter)]
///     length: Mapping<String, usize>,
/// }
/// ```
#[proc_macro_derive(ConverterSet, attributes(remap))]
pub fn derive_converter_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match converter_set_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn converter_set_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "ConverterSet requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "ConverterSet only supports structs",
            ))
        }
    };

    let mut registrations = Vec::new();
    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;

        let mut is_converter = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("remap") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("converter") {
                    is_converter = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown remap attribute (expected `converter`)"))
                }
            })?;
        }

        if is_converter {
            registrations.push(quote! {
                engine.add_mapping_entry(&self.#field_ident)?;
            });
        }
    }

    // Avoid an unused-variable warning when no field is marked.
    let engine_param = if registrations.is_empty() {
        quote! { _engine }
    } else {
        quote! { engine }
    };

    Ok(quote! {
        impl ::remap::mapping_set::ConverterSet for #name {
            fn register_into(
                &self,
                #engine_param: &::remap::engine::Engine,
            ) -> ::remap::error::Result<()> {
                #(#registrations)*
                ::core::result::Result::Ok(())
            }
        }
    })
}
