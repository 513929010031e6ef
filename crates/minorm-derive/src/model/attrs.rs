//! Attribute parsing for the Model derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use syn::{DeriveInput, Result};

/// Struct-level `#[orm(table = "...", display = "...")]`.
#[derive(Default)]
pub(super) struct ModelAttr {
    pub table: Option<String>,
    pub display: Option<String>,
}

impl syn::parse::Parse for ModelAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = ModelAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            if ident == "table" {
                attr.table = Some(value.value());
            } else if ident == "display" {
                attr.display = Some(value.value());
            } else {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown #[orm] attribute; expected `table` or `display`",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// Field-level `#[orm(id)]` / `#[orm(blank = false)]`.
pub(super) struct FieldAttr {
    pub is_id: bool,
    pub blank: bool,
}

impl Default for FieldAttr {
    fn default() -> Self {
        Self {
            is_id: false,
            blank: true,
        }
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "id" {
                attr.is_id = true;
            } else if ident == "blank" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitBool = input.parse()?;
                attr.blank = value.value;
            } else {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown #[orm] field attribute; expected `id` or `blank = ...`",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// Merge every struct-level `#[orm(...)]` attribute.
pub(super) fn get_model_attr(input: &DeriveInput) -> Result<ModelAttr> {
    let mut merged = ModelAttr::default();
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            let parsed: ModelAttr = attr.parse_args()?;
            merged.table = parsed.table.or(merged.table);
            merged.display = parsed.display.or(merged.display);
        }
    }
    Ok(merged)
}

/// Merge every `#[orm(...)]` attribute on a field.
pub(super) fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            let parsed: FieldAttr = attr.parse_args()?;
            merged.is_id |= parsed.is_id;
            merged.blank &= parsed.blank;
        }
    }
    Ok(merged)
}
