//! Decoding backend rows into positional [`Value`] tuples.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{FromSql, Type};

/// Extension trait for `tokio_postgres::Row`.
pub trait RowExt {
    /// Try to get a column value, returning `OrmError::Decode` on failure
    fn try_get_column<T>(&self, idx: usize) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Decode every column by its Postgres type.
    fn to_values(&self) -> OrmResult<Vec<Value>>;
}

impl RowExt for tokio_postgres::Row {
    fn try_get_column<T>(&self, idx: usize) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(idx).map_err(|e| {
            let name = self
                .columns()
                .get(idx)
                .map_or_else(|| idx.to_string(), |c| c.name().to_string());
            OrmError::decode(name, e.to_string())
        })
    }

    fn to_values(&self) -> OrmResult<Vec<Value>> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| decode_column(self, idx, column.type_()))
            .collect()
    }
}

fn decode_column(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> OrmResult<Value> {
    let value = match *ty {
        Type::BOOL => row.try_get_column::<Option<bool>>(idx)?.into(),
        Type::INT2 => row.try_get_column::<Option<i16>>(idx)?.into(),
        Type::INT4 => row.try_get_column::<Option<i32>>(idx)?.into(),
        Type::INT8 => row.try_get_column::<Option<i64>>(idx)?.into(),
        Type::OID => row.try_get_column::<Option<u32>>(idx)?.into(),
        Type::FLOAT4 => row.try_get_column::<Option<f32>>(idx)?.into(),
        Type::FLOAT8 => row.try_get_column::<Option<f64>>(idx)?.into(),
        Type::DATE => row.try_get_column::<Option<NaiveDate>>(idx)?.into(),
        Type::TIMESTAMP => row.try_get_column::<Option<NaiveDateTime>>(idx)?.into(),
        Type::TIMESTAMPTZ => row.try_get_column::<Option<DateTime<Utc>>>(idx)?.into(),
        // TEXT, VARCHAR, BPCHAR, NAME and anything else String can read
        _ => row.try_get_column::<Option<String>>(idx)?.into(),
    };
    Ok(value)
}
