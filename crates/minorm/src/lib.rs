//! # minorm
//!
//! A minimal model/manager ORM.
//!
//! ## Features
//!
//! - **Declared schema**: a model is a struct with an explicit, ordered field list (`id` first)
//! - **Chainable queries**: `filter`, `order_by`, `limit` and `slice` return new query sets
//! - **Lazy execution**: nothing runs until a terminal call, which materialises every row
//! - **Django-style lookups**: `id__gt`, `id__gte`, `id__lt`, `id__lte`, `id__ne`
//! - **JSON round trip**: instances and result sets to and from flat JSON objects
//! - **Explicit connection**: pass a [`Database`] (or any [`Executor`]) to terminal calls
//!
//! ```ignore
//! use minorm::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Model)]
//! #[orm(display = "name")]
//! struct HelperModel {
//!     id: Option<i64>,
//!     #[orm(blank = false)]
//!     list_id: Option<i64>,
//!     #[orm(blank = false)]
//!     name: Option<String>,
//! }
//!
//! let db = Database::connect(DatabaseConfig::from_env()?).await?;
//!
//! let saved = HelperModel::objects()
//!     .create_from_json(&db, r#"{"name": "Cat", "list_id": 7}"#)
//!     .await?;
//!
//! let newest = HelperModel::objects()
//!     .filter(Filter::eq("list_id", 7))
//!     .order_by("-id")
//!     .limit(5)
//!     .fetch(&db)
//!     .await?;
//! ```
//!
//! Values are rendered into the SQL text as quoted literals, unescaped. Only pass trusted
//! input.

pub mod client;
pub mod condition;
pub mod config;
pub mod database;
pub mod error;
pub mod field;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod query;
pub mod record;
pub mod row;
pub mod serializer;
pub mod sql;
pub mod value;

pub use client::{Executor, Row};
pub use condition::{Conditions, Filter, Op, conditions_to_sql};
pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{OrmError, OrmResult};
pub use field::{FieldDef, FieldKind};
pub use model::Model;
pub use monitor::{QueryType, SqlLogger};
pub use query::{Manager, QuerySet};
pub use record::Record;
pub use row::RowExt;
pub use sql::{Dialect, Limit, OrderBy};
pub use value::{FieldValue, Value};

#[cfg(feature = "derive")]
pub use minorm_derive::Model;

#[cfg(test)]
pub(crate) mod testing;
