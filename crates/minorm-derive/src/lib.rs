//! Derive macros for minorm
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;

/// Derive `minorm::Model` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use minorm::Model;
///
/// #[derive(Debug, Clone, Default, Model)]
/// #[orm(display = "name")]
/// struct HelperModel {
///     id: Option<i64>,
///     #[orm(blank = false)]
///     list_id: Option<i64>,
///     #[orm(blank = false)]
///     name: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `impl minorm::Model` with `NAME`, `TABLE`, `SCHEMA` (`id` first, then the declared
///   fields in order), `id`, `set_id`, `values` and `from_record`
/// - `impl Display`: the `display` field's value, or the literal `Object`
/// - `fn valid_<field>(&self) -> bool` for every non-id field
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (defaults to the lowercased struct name)
/// - `#[orm(display = "field")]` - Field rendered by `Display`
/// - `#[orm(id)]` - Mark the `Option<i64>` primary key when it is not named `id`
/// - `#[orm(blank = false)]` - Require a non-empty value for validation
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
