//! Convenient imports for typical `minorm` usage.
//!
//! ```ignore
//! use minorm::prelude::*;
//! ```

pub use crate::{
    Database, DatabaseConfig, Executor, Filter, Manager, Model, Op, OrmError, OrmResult,
    QuerySet, Record, Value,
};
