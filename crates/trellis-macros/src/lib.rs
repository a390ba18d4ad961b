//! Procedural macros for Trellis targets.
//!
//! This crate provides `#[derive(Target)]`, which implements
//! `trellis_core::Target` and builds the type's `MethodTable` from its fields.
//!
//! # Attributes
//!
//! ## `#[style]`
//!
//! Marks a `Property<T>` field as configurable. For a field `corner_radius`
//! the table exposes:
//!
//! - `cornerRadius` (zero-argument probe)
//! - `setCornerRadius` (setter, one argument)
//! - `cornerRadius=` (assignment, one argument)
//!
//! Field attributes:
//! - `read_only`: only the probe is exposed
//! - `rename = "selector"`: use this native name instead of the camelCased field name
//!
//! ## `#[target]`
//!
//! Struct-level configuration:
//!
//! ```ignore
//! #[derive(Target)]
//! #[target(name = "Button", extends = "Control, View", methods = "button_methods")]
//! struct PushButton {
//!     base: TargetBase,
//!     #[style]
//!     title: Property<String>,
//! }
//!
//! impl PushButton {
//!     fn button_methods(table: MethodTable<Self>) -> MethodTable<Self> {
//!         table.method("setTitle:forState:", Arity::Exact(2), |b, args| { /* ... */ })
//!     }
//! }
//! ```
//!
//! - `name = "..."`: type name used for provider lookup (defaults to the struct name)
//! - `extends = "A, B"`: ancestor type names, nearest first
//! - `methods = "fn_name"`: an associated function that adds hand-written selectors
//! - `deferred`: setters apply later and never show through a probe

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Field, Fields, Ident, Lit, LitStr, Meta, Type,
    parse_macro_input,
};

/// Derive `trellis_core::Target` and generate the method table.
///
/// The struct must have a `base: TargetBase` field.
///
/// # Example
///
/// ```ignore
/// use trellis::prelude::*;
///
/// #[derive(Target)]
/// struct Layer {
///     base: TargetBase,
///
///     #[style]
///     corner_radius: Property<f64>,
///
///     #[style(read_only)]
///     sublayer_count: Property<i64>,
/// }
/// ```
#[proc_macro_derive(Target, attributes(target, style))]
pub fn derive_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_target(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[style]` field information.
struct StyleInfo {
    field_name: Ident,
    inner_type: Type,
    native_name: Option<String>,
    read_only: bool,
}

/// Parsed struct-level `#[target]` attributes.
struct TargetAttrs {
    name: Option<String>,
    extends: Vec<String>,
    methods: Option<Ident>,
    deferred: bool,
}

fn impl_derive_target(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Target derive does not support generic structs",
        ));
    }

    let attrs = parse_target_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Target derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Target derive only supports structs",
            ));
        }
    };

    let has_base = fields
        .iter()
        .any(|f| f.ident.as_ref().is_some_and(|i| i == "base"));
    if !has_base {
        return Err(syn::Error::new_spanned(
            input,
            "Target derive requires a `base: TargetBase` field",
        ));
    }

    let mut styles = Vec::new();
    for field in fields.iter() {
        if let Some(info) = parse_style_field(field)? {
            styles.push(info);
        }
    }

    let type_name = attrs.name.unwrap_or_else(|| struct_name.to_string());
    let ancestors = &attrs.extends;
    let deferred = attrs.deferred;

    let registrations = styles
        .iter()
        .map(|style| generate_registration(struct_name, style));

    let extra = match &attrs.methods {
        Some(method) => quote! { let table = #struct_name::#method(table); },
        None => quote! {},
    };

    let expanded = quote! {
        impl #struct_name {
            /// The method table generated by `#[derive(Target)]`.
            #[doc(hidden)]
            pub fn __trellis_method_table() -> &'static ::trellis_core::MethodTable<#struct_name> {
                static METHODS: ::trellis_core::__private::LazyLock<
                    ::trellis_core::MethodTable<#struct_name>,
                > = ::trellis_core::__private::LazyLock::new(|| {
                    let table = ::trellis_core::MethodTable::<#struct_name>::new();
                    #(#registrations)*
                    #extra
                    table
                });
                &METHODS
            }
        }

        impl ::trellis_core::Target for #struct_name {
            fn id(&self) -> ::trellis_core::TargetId {
                self.base.id()
            }

            fn target_type(&self) -> &'static ::trellis_core::TargetType {
                static TARGET_TYPE: ::trellis_core::TargetType =
                    ::trellis_core::TargetType::new(#type_name, &[#(#ancestors),*]);
                &TARGET_TYPE
            }

            fn meta(&self) -> &::trellis_core::TargetMeta {
                self.base.meta()
            }

            fn arity_of(&self, selector: &str) -> ::core::option::Option<::trellis_core::Arity> {
                #struct_name::__trellis_method_table().arity_of(selector)
            }

            fn send(
                &self,
                selector: &str,
                args: &[::trellis_core::Value],
            ) -> ::trellis_core::Result<::trellis_core::Value> {
                let type_name = ::trellis_core::Target::target_type(self).name();
                #struct_name::__trellis_method_table().invoke(self, type_name, selector, args)
            }

            fn applies_deferred(&self) -> bool {
                #deferred
            }
        }
    };

    Ok(expanded)
}

/// Generate the table entries for one `#[style]` field.
fn generate_registration(struct_name: &Ident, style: &StyleInfo) -> TokenStream2 {
    let field_name = &style.field_name;
    let inner_type = &style.inner_type;
    let native = match &style.native_name {
        Some(name) => quote! { ::std::string::String::from(#name) },
        None => {
            let snake = field_name.to_string();
            quote! { ::trellis_core::naming::camel_case(#snake) }
        }
    };

    let setters = if style.read_only {
        quote! {}
    } else {
        quote! {
            let table = table.setter(
                ::trellis_core::naming::setter_name(&native),
                |target: &#struct_name, value: #inner_type| target.#field_name.set_silent(value),
            );
            let table = table.setter(
                ::std::format!("{}=", native),
                |target: &#struct_name, value: #inner_type| target.#field_name.set_silent(value),
            );
        }
    };

    quote! {
        let table = {
            let native: ::std::string::String = #native;
            let table = table.getter(native.clone(), |target: &#struct_name| target.#field_name.get());
            #setters
            table
        };
    }
}

/// Parse struct-level `#[target(...)]` attributes.
fn parse_target_attrs(attrs: &[Attribute]) -> syn::Result<TargetAttrs> {
    let mut result = TargetAttrs {
        name: None,
        extends: Vec::new(),
        methods: None,
        deferred: false,
    };

    for attr in attrs {
        if !attr.path().is_ident("target") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(parse_string(&meta)?.value());
            } else if meta.path.is_ident("extends") {
                let list = parse_string(&meta)?.value();
                result.extends = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            } else if meta.path.is_ident("methods") {
                let lit = parse_string(&meta)?;
                result.methods = Some(lit.parse()?);
            } else if meta.path.is_ident("deferred") {
                result.deferred = true;
            } else {
                return Err(meta.error("unknown target attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Parse a field carrying `#[style]`.
fn parse_style_field(field: &Field) -> syn::Result<Option<StyleInfo>> {
    let Some(field_name) = field.ident.clone() else {
        return Ok(None);
    };

    let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("style")) else {
        return Ok(None);
    };

    let mut native_name = None;
    let mut read_only = false;

    // `#[style]` alone carries no arguments.
    if matches!(attr.meta, Meta::List(_)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("read_only") {
                read_only = true;
            } else if meta.path.is_ident("rename") {
                native_name = Some(parse_string(&meta)?.value());
            } else {
                return Err(meta.error("unknown style attribute"));
            }
            Ok(())
        })?;
    }

    let Some(inner_type) = extract_inner_type(&field.ty) else {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "#[style] fields must have type Property<T>",
        ));
    };

    Ok(Some(StyleInfo {
        field_name,
        inner_type,
        native_name,
        read_only,
    }))
}

/// Parse `key = "value"` inside a nested meta list.
fn parse_string(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<LitStr> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit_str),
            ..
        }) => Ok(lit_str),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Extract `T` from `Property<T>`.
fn extract_inner_type(ty: &Type) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Property" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner.clone()),
            _ => None,
        },
        _ => None,
    }
}
