//! SQL clause and statement rendering.
//!
//! Clause texts follow a fixed contract (`LIMIT n `, `LIMIT a, b-a `, `ORDER BY col DESC`,
//! `UPDATE t SET col = 'v' WHERE id = n`). [`Dialect`] only changes the forms a backend
//! would reject outright: the offset/count limit and the insert column list.

use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::record::Record;
use std::fmt;
use std::ops::Range;

/// SQL flavour spoken by an [`Executor`](crate::Executor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `LIMIT offset, count`; insert ids reported by the backend.
    #[default]
    MySql,
    /// `LIMIT count OFFSET offset`; inserts use `RETURNING id`.
    Postgres,
}

/// Row limit produced by `limit(n)` / `slice(a..b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// First `n` rows.
    First(u64),
    /// Skip `offset` rows, return `count`.
    Range { offset: u64, count: u64 },
}

impl Limit {
    /// A slice `a..b` becomes offset `a`, count `b - a` (never negative).
    pub fn from_range(range: Range<u64>) -> Self {
        Limit::Range {
            offset: range.start,
            count: range.end.saturating_sub(range.start),
        }
    }

    /// Clause text, including its trailing space.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        match (self, dialect) {
            (Limit::First(n), _) => format!("LIMIT {n} "),
            (Limit::Range { offset, count }, Dialect::MySql) => {
                format!("LIMIT {offset}, {count} ")
            }
            (Limit::Range { offset, count }, Dialect::Postgres) => {
                format!("LIMIT {count} OFFSET {offset} ")
            }
        }
    }
}

/// Single-column ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    /// Parse `name` (ascending) or `-name` (descending).
    pub fn parse(field: &str) -> Self {
        match field.strip_prefix('-') {
            Some(column) => Self {
                column: column.to_string(),
                descending: true,
            },
            None => Self {
                column: field.to_string(),
                descending: false,
            },
        }
    }

    pub fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("ORDER BY {} {}", self.column, direction)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// `INSERT` for a model instance.
///
/// MySQL inserts every column, NULL id included, so the backend assigns the key. Postgres
/// leaves an unset id out of the column list and asks for it back with `RETURNING id`.
pub fn insert_sql<M: Model>(instance: &M, dialect: Dialect) -> String {
    match dialect {
        Dialect::MySql => format!(
            "INSERT INTO {} ({}) VALUES {}",
            M::TABLE,
            M::select_list(),
            instance.values_sql()
        ),
        Dialect::Postgres => {
            let (columns, values): (Vec<&str>, Vec<String>) = M::SCHEMA
                .iter()
                .zip(instance.values())
                .filter(|(def, value)| !(def.primary_key && value.is_null()))
                .map(|(def, value)| (def.name, value.sql_literal()))
                .unzip();
            if columns.is_empty() {
                format!("INSERT INTO {} DEFAULT VALUES RETURNING id", M::TABLE)
            } else {
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
                    M::TABLE,
                    columns.join(", "),
                    values.join(", ")
                )
            }
        }
    }
}

/// Full-row `UPDATE` keyed by the instance id. Every declared field is rewritten.
pub fn update_sql<M: Model>(instance: &M) -> OrmResult<String> {
    let id = require_id(instance, "update")?;
    let assignments: Vec<String> = M::SCHEMA
        .iter()
        .zip(instance.values())
        .map(|(def, value)| format!("{} = {}", def.name, value.quoted()))
        .collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE id = {}",
        M::TABLE,
        assignments.join(", "),
        id
    ))
}

/// Partial `UPDATE` from the supplied values only, with an optional WHERE clause.
pub fn update_sql_from_record(
    table: &str,
    values: &Record,
    where_clause: &str,
) -> OrmResult<String> {
    if values.is_empty() {
        return Err(OrmError::validation("UPDATE requires at least one value"));
    }
    let assignments: Vec<String> = values
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value.quoted()))
        .collect();
    Ok(format!(
        "UPDATE {} SET {}{}",
        table,
        assignments.join(", "),
        where_clause
    ))
}

/// `DELETE` of a single instance by id.
pub fn delete_sql<M: Model>(instance: &M) -> OrmResult<String> {
    let id = require_id(instance, "delete")?;
    Ok(format!("DELETE FROM {} WHERE id = {}", M::TABLE, id))
}

/// Wrap a compiled SELECT in a `COUNT(*)`.
pub fn count_sql(select: &str) -> String {
    format!("SELECT COUNT(*) FROM ({}) AS counted", select.trim_end())
}

fn require_id<M: Model>(instance: &M, action: &str) -> OrmResult<i64> {
    instance.id().ok_or_else(|| {
        OrmError::validation(format!(
            "cannot {action} {} instance without an id (save it first)",
            M::NAME
        ))
    })
}
