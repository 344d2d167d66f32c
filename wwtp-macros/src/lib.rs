//! Procedural macros for wastewater process reports
//!
//! # Overview
//!
//! The `ProcessVariables` derive macro turns a struct of typed stage variables into
//! an implementation of `wwtp_core::report::ProcessVariables`, so every unit process
//! keeps its derived quantities as named `f64` fields and still produces an ordered
//! report with units and descriptions.
//!
//! # Example
//!
//! ```ignore
//! use wwtp_core::ProcessVariables;
//!
//! #[derive(ProcessVariables)]
//! pub struct SettlerVariables {
//!     #[variable(name = "Qe", unit = "ML/d", description = "Effluent flow")]
//!     pub effluent_flow: f64,
//!
//!     // Not reported
//!     pub scratch: f64,
//! }
//! ```
//!
//! Fields without a `#[variable]` attribute are skipped. The reported name defaults
//! to the Rust field name.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr};

/// Metadata for a reported field
struct VariableField {
    rust_name: Ident,
    name: String,
    unit: String,
    description: String,
}

/// Parse a `#[variable(...)]` attribute using the syn 2.0 API
fn parse_variable_attribute(attr: &Attribute, rust_name: &Ident) -> syn::Result<VariableField> {
    let mut name = None;
    let mut unit = String::new();
    let mut description = String::new();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let value: LitStr = meta.value()?.parse()?;
            name = Some(value.value());
        } else if meta.path.is_ident("unit") {
            let value: LitStr = meta.value()?.parse()?;
            unit = value.value();
        } else if meta.path.is_ident("description") {
            let value: LitStr = meta.value()?.parse()?;
            description = value.value();
        } else {
            return Err(meta.error("expected `name`, `unit` or `description`"));
        }
        Ok(())
    })?;

    Ok(VariableField {
        rust_name: rust_name.clone(),
        name: name.unwrap_or_else(|| rust_name.to_string()),
        unit,
        description,
    })
}

/// Collect the `#[variable]` fields of a struct, in declaration order
fn extract_variable_fields(fields: &Fields) -> syn::Result<Vec<VariableField>> {
    let mut variables = Vec::new();

    if let Fields::Named(named) = fields {
        for field in &named.named {
            let Some(rust_name) = field.ident.as_ref() else {
                continue;
            };
            for attr in &field.attrs {
                if attr.path().is_ident("variable") {
                    variables.push(parse_variable_attribute(attr, rust_name)?);
                }
            }
        }
    }

    Ok(variables)
}

/// Derive macro implementing `ProcessVariables` for a struct of `f64` fields
///
/// # Attributes
///
/// ## Field attributes
/// - `#[variable(name = "...", unit = "...", description = "...")]` - Report this field
#[proc_macro_derive(ProcessVariables, attributes(variable))]
pub fn derive_process_variables(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return syn::Error::new_spanned(
                struct_name,
                "ProcessVariables can only be derived for structs",
            )
            .to_compile_error()
            .into()
        }
    };

    let variables = match extract_variable_fields(fields) {
        Ok(variables) => variables,
        Err(err) => return err.to_compile_error().into(),
    };

    let inserts: Vec<TokenStream2> = variables
        .iter()
        .map(|v| {
            let field = &v.rust_name;
            let name = &v.name;
            let unit = &v.unit;
            let description = &v.description;
            quote! {
                report.insert(#name, self.#field, #unit, #description);
            }
        })
        .collect();

    let expanded = quote! {
        impl #impl_generics ::wwtp_core::report::ProcessVariables for #struct_name #ty_generics #where_clause {
            fn to_report(&self) -> ::wwtp_core::report::ProcessReport {
                let mut report = ::wwtp_core::report::ProcessReport::new();
                #(#inserts)*
                report
            }
        }
    };

    TokenStream::from(expanded)
}
