//! Model derive macro implementation

mod attrs;

use attrs::{get_field_attr, get_model_attr};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Result};

/// A declared, non-id field.
struct ColumnField<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    name: String,
    blank: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let model_attr = get_model_attr(&input)?;
    let table_name = model_attr
        .table
        .clone()
        .unwrap_or_else(|| name.to_string().to_lowercase());
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields.iter() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        parsed.push((ident, field, get_field_attr(field)?));
    }

    let marked: Vec<_> = parsed.iter().filter(|(_, _, attr)| attr.is_id).collect();
    if marked.len() > 1 {
        return Err(syn::Error::new_spanned(
            marked[1].1,
            "Model supports exactly one #[orm(id)] field",
        ));
    }
    let id_ident = match marked.first() {
        Some((ident, _, _)) => *ident,
        None => match parsed.iter().find(|(ident, _, _)| *ident == "id") {
            Some((ident, _, _)) => *ident,
            None => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model requires an `id: Option<i64>` field (or one marked #[orm(id)])",
                ));
            }
        },
    };

    let columns: Vec<ColumnField> = parsed
        .iter()
        .filter(|(ident, _, _)| *ident != id_ident)
        .map(|(ident, field, attr)| ColumnField {
            ident: *ident,
            ty: &field.ty,
            name: ident.to_string(),
            blank: attr.blank,
        })
        .collect();

    if let Some(clash) = columns.iter().find(|c| c.name == "id") {
        return Err(syn::Error::new_spanned(
            clash.ident,
            "a field named `id` must be the primary key",
        ));
    }

    let schema_entries = columns.iter().map(|c| {
        let column = &c.name;
        let ty = c.ty;
        let blank = c.blank;
        quote! {
            ::minorm::FieldDef {
                name: #column,
                kind: <#ty as ::minorm::FieldValue>::KIND,
                nullable: <#ty as ::minorm::FieldValue>::NULLABLE,
                blank: #blank,
                primary_key: false,
            }
        }
    });

    let value_exprs = columns.iter().map(|c| {
        let ident = c.ident;
        quote! { ::minorm::FieldValue::to_value(&self.#ident) }
    });

    let decode_fields = columns.iter().map(|c| {
        let ident = c.ident;
        let column = &c.name;
        quote! { #ident: record.decode(#column)? }
    });

    let validators = columns.iter().map(|c| {
        let ident = c.ident;
        let method = format_ident!("valid_{}", ident);
        let doc = format!("Whether `{}` holds an acceptable value.", c.name);
        let body = if c.blank {
            quote! { true }
        } else {
            quote! { !::minorm::FieldValue::to_value(&self.#ident).is_empty() }
        };
        quote! {
            #[doc = #doc]
            pub fn #method(&self) -> bool {
                #body
            }
        }
    });

    let display_body = match &model_attr.display {
        Some(display) => {
            let Some(column) = columns.iter().find(|c| c.name == *display) else {
                return Err(syn::Error::new_spanned(
                    &input,
                    format!("#[orm(display = \"{display}\")] does not name a declared field"),
                ));
            };
            let ident = column.ident;
            quote! {
                let value = ::minorm::FieldValue::to_value(&self.#ident);
                if value.is_null() {
                    ::std::result::Result::Ok(())
                } else {
                    ::std::write!(f, "{}", value)
                }
            }
        }
        None => quote! { f.write_str("Object") },
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::minorm::Model for #name #ty_generics #where_clause {
            const NAME: &'static str = #type_name;
            const TABLE: &'static str = #table_name;
            const SCHEMA: &'static [::minorm::FieldDef] = &[
                ::minorm::FieldDef::id(),
                #(#schema_entries,)*
            ];

            fn id(&self) -> ::std::option::Option<i64> {
                self.#id_ident
            }

            fn set_id(&mut self, id: ::std::option::Option<i64>) {
                self.#id_ident = id;
            }

            fn values(&self) -> ::std::vec::Vec<::minorm::Value> {
                ::std::vec![
                    ::minorm::FieldValue::to_value(&self.#id_ident),
                    #(#value_exprs,)*
                ]
            }

            fn from_record(record: &::minorm::Record) -> ::minorm::OrmResult<Self> {
                ::std::result::Result::Ok(Self {
                    #id_ident: record.decode("id")?,
                    #(#decode_fields,)*
                })
            }
        }

        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #display_body
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #(#validators)*
        }
    })
}
