//! Query condition types and the WHERE-clause compiler.
//!
//! A [`Filter`] is a structured `(column, operator, value)` triple. The Django-style
//! `field__op` key form is accepted at the boundary by [`Filter::lookup`], which is the
//! only place operator suffixes are parsed.
//!
//! ```ignore
//! use minorm::{Filter, Op};
//!
//! Filter::eq("list_id", 2);
//! Filter::gt("id", 1);
//! Filter::lookup("id__gte", 1);      // same as Filter::gte("id", 1)
//! Filter::lookup("weird__name", 1);  // unknown suffix: column "weird__name", equality
//! ```

use crate::value::Value;
use std::fmt;

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal: column = value
    Eq,
    /// Not equal: column != value
    Ne,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than: column < value
    Lt,
    /// Less than or equal: column <= value
    Lte,
}

impl Op {
    /// SQL comparison operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }

    /// Lookup suffix (`gt` in `id__gt`). Equality has none.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Op::Eq => None,
            Op::Ne => Some("ne"),
            Op::Gt => Some("gt"),
            Op::Gte => Some("gte"),
            Op::Lt => Some("lt"),
            Op::Lte => Some("lte"),
        }
    }

    /// Parse a lookup suffix. Returns `None` for unrecognized tokens.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ne" => Some(Op::Ne),
            "gt" => Some(Op::Gt),
            "gte" => Some(Op::Gte),
            "lt" => Some(Op::Lt),
            "lte" => Some(Op::Lte),
            _ => None,
        }
    }
}

/// A single `column <op> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Parse a `field` / `field__op` lookup key.
    ///
    /// The key is split on its last `__`; if the suffix is not a known operator the whole
    /// key is taken as the column name and equality is used.
    pub fn lookup(key: &str, value: impl Into<Value>) -> Self {
        if let Some((column, suffix)) = key.rsplit_once("__") {
            if let Some(op) = Op::from_suffix(suffix) {
                return Self::new(column, op, value);
            }
        }
        Self::new(key, Op::Eq, value)
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lte, value)
    }

    /// The lookup key this filter merges under (`id`, `id__gt`, ...).
    pub fn key(&self) -> String {
        match self.op.suffix() {
            Some(suffix) => format!("{}__{}", self.column, suffix),
            None => self.column.clone(),
        }
    }

    /// Render as `column <op> '<value>'`.
    pub fn to_sql(&self) -> String {
        format!("{} {} {}", self.column, self.op.as_sql(), self.value.quoted())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// The ANDed condition set accumulated by a query.
///
/// Merging follows mapping-update semantics: a filter with the same lookup key as an
/// existing one replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    filters: Vec<Filter>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one filter, replacing an existing filter with the same lookup key.
    pub fn merge(&mut self, filter: Filter) {
        let key = filter.key();
        match self.filters.iter_mut().find(|f| f.key() == key) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
    }

    /// Merge every filter in order.
    pub fn extend(&mut self, filters: impl IntoIterator<Item = Filter>) {
        for filter in filters {
            self.merge(filter);
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Value stored under a lookup key, e.g. `get("id__gt")`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.filters.iter().find(|f| f.key() == key).map(|f| &f.value)
    }

    /// `(lookup key, value)` pairs in merge order.
    pub fn lookups(&self) -> Vec<(String, Value)> {
        self.filters
            .iter()
            .map(|f| (f.key(), f.value.clone()))
            .collect()
    }

    /// Compile to a `" WHERE "`-prefixed clause, or an empty string without conditions.
    pub fn to_sql(&self) -> String {
        if self.filters.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self.filters.iter().map(Filter::to_sql).collect();
        format!(" WHERE {}", parts.join(" AND "))
    }
}

impl FromIterator<Filter> for Conditions {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        conditions.extend(iter);
        conditions
    }
}

/// Compile lookup-key conditions straight to a WHERE clause.
///
/// ```ignore
/// assert_eq!(conditions_to_sql([("id__gt", 1)]), " WHERE id > '1'");
/// ```
pub fn conditions_to_sql<K, V>(lookups: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: Into<Value>,
{
    lookups
        .into_iter()
        .map(|(k, v)| Filter::lookup(k.as_ref(), v))
        .collect::<Conditions>()
        .to_sql()
}
