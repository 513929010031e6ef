//! Chainable, immutable query sets and the per-model manager.
//!
//! Every narrowing call (`filter`, `order_by`, `limit`, `slice`) consumes the query set
//! and returns a new one carrying the merged state; clone a query set to branch it.
//! Nothing runs until a terminal call (`fetch`, `len`, `count`, `get`, `json`, `update`,
//! `delete`), which compiles the state, performs one round trip and materialises the full
//! result.
//!
//! ```ignore
//! use minorm::{Filter, Model};
//!
//! let lists = HelperModel::objects()
//!     .filter(Filter::eq("list_id", 2))
//!     .order_by("-id")
//!     .fetch(&db)
//!     .await?;
//!
//! // builder[2:4]
//! let page = HelperModel::objects().all().slice(2..4).fetch(&db).await?;
//! ```
//!
//! Values are interpolated into the SQL text as quoted literals without escaping. Do not
//! pass untrusted input.

use crate::client::Executor;
use crate::condition::{Conditions, Filter};
use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::record::Record;
use crate::serializer;
use crate::sql::{self, Dialect, Limit, OrderBy};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

/// Accumulated filter/order/limit state for model `M`.
pub struct QuerySet<M> {
    conditions: Conditions,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for QuerySet<M> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("model", &M::NAME)
            .field("conditions", &self.conditions)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<M: Model> QuerySet<M> {
    /// An unfiltered query over every row of `M`.
    pub fn new() -> Self {
        Self {
            conditions: Conditions::new(),
            order_by: None,
            limit: None,
            _model: PhantomData,
        }
    }

    // ==================== Narrowing (consuming builder) ====================

    /// Merge one condition. A repeated lookup key overwrites the earlier value.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.conditions.merge(filter);
        self
    }

    /// Merge several conditions in order.
    pub fn filter_all(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Merge a `field` / `field__op` lookup.
    pub fn lookup(self, key: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::lookup(key, value))
    }

    /// Merge every entry of a mapping as a lookup.
    pub fn filter_record(self, lookups: &Record) -> Self {
        self.filter_all(lookups.iter().map(|(k, v)| Filter::lookup(k, v.clone())))
    }

    /// Add WHERE: column = value
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Add WHERE: column != value
    pub fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::ne(column, value))
    }

    /// Add WHERE: column > value
    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::gt(column, value))
    }

    /// Add WHERE: column >= value
    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::gte(column, value))
    }

    /// Add WHERE: column < value
    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::lt(column, value))
    }

    /// Add WHERE: column <= value
    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::lte(column, value))
    }

    /// Order by `column` ascending, or `-column` descending. Replaces any earlier order.
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy::parse(field));
        self
    }

    /// Keep the first `n` rows (`builder[n]`). This is a page size, not a row index.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Limit::First(n));
        self
    }

    /// Skip `range.start` rows and keep `range.end - range.start` (`builder[a:b]`).
    pub fn slice(mut self, range: Range<u64>) -> Self {
        self.limit = Some(Limit::from_range(range));
        self
    }

    // ==================== Compilation ====================

    /// Base `SELECT <cols> FROM <table>`.
    pub fn base_sql(&self) -> String {
        M::simple_query()
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// `" WHERE ..."` or an empty string.
    pub fn where_clause(&self) -> String {
        self.conditions.to_sql()
    }

    /// `ORDER BY <col> ASC|DESC` or an empty string.
    pub fn order_clause(&self) -> String {
        self.order_by.as_ref().map(OrderBy::to_sql).unwrap_or_default()
    }

    /// `LIMIT ...` with its trailing space, or an empty string.
    pub fn limit_clause(&self, dialect: Dialect) -> String {
        self.limit
            .map(|limit| limit.to_sql(dialect))
            .unwrap_or_default()
    }

    /// Base select, WHERE, ORDER BY, LIMIT, in that order.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut sql = self.base_sql();
        sql.push_str(&self.where_clause());
        for clause in [self.order_clause(), self.limit_clause(dialect)] {
            if !clause.is_empty() {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
        sql
    }

    /// Partial `UPDATE` setting only `values`, restricted by the accumulated conditions.
    pub fn bulk_update_sql(&self, values: &Record) -> OrmResult<String> {
        sql::update_sql_from_record(M::TABLE, values, &self.where_clause())
    }

    /// `DELETE` restricted by the accumulated conditions.
    ///
    /// Refuses to build an unconditional DELETE.
    pub fn delete_sql(&self) -> OrmResult<String> {
        if self.conditions.is_empty() {
            return Err(OrmError::validation(format!(
                "refusing to DELETE every row of {} without conditions",
                M::TABLE
            )));
        }
        Ok(format!("DELETE FROM {}{}", M::TABLE, self.where_clause()))
    }

    // ==================== Terminal operations ====================

    /// Execute and materialise every matching row, in backend order.
    pub async fn fetch(&self, conn: &impl Executor) -> OrmResult<Vec<M>> {
        let rows = conn.fetch(&self.to_sql(conn.dialect())).await?;
        rows.into_iter().map(M::from_row).collect()
    }

    /// Number of materialised rows.
    pub async fn len(&self, conn: &impl Executor) -> OrmResult<usize> {
        Ok(self.fetch(conn).await?.len())
    }

    /// `COUNT(*)` over the compiled query, limit included.
    pub async fn count(&self, conn: &impl Executor) -> OrmResult<i64> {
        let statement = sql::count_sql(&self.to_sql(conn.dialect()));
        conn.fetch_scalar(&statement).await
    }

    /// The single matching instance.
    ///
    /// Zero rows is [`OrmError::NotFound`]; more than one is
    /// [`OrmError::MultipleObjectsReturned`].
    pub async fn get(&self, conn: &impl Executor) -> OrmResult<M> {
        let mut found = self.fetch(conn).await?;
        match found.len() {
            0 => Err(OrmError::not_found(format!(
                "{} matching{}",
                M::NAME,
                self.where_clause()
            ))),
            1 => Ok(found.remove(0)),
            got => {
                tracing::warn!(model = M::NAME, got, "get() matched more than one row");
                Err(OrmError::MultipleObjectsReturned { got })
            }
        }
    }

    /// [`QuerySet::get`] serialized as a JSON object.
    pub async fn get_json(&self, conn: &impl Executor) -> OrmResult<String> {
        serializer::to_json(&self.get(conn).await?)
    }

    /// Execute and serialize the result as a JSON array, preserving order.
    pub async fn json(&self, conn: &impl Executor) -> OrmResult<String> {
        serializer::to_json_array(&self.fetch(conn).await?)
    }

    /// Set only `values` on every matching row (all rows without conditions).
    pub async fn update(&self, conn: &impl Executor, values: &Record) -> OrmResult<u64> {
        conn.execute(&self.bulk_update_sql(values)?).await
    }

    /// Delete every matching row. Requires at least one condition.
    pub async fn delete(&self, conn: &impl Executor) -> OrmResult<u64> {
        conn.execute(&self.delete_sql()?).await
    }
}

impl<M: Model> Default for QuerySet<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-model query factory, obtained with [`Model::objects`].
///
/// Each call hands out an independent [`QuerySet`]; no state is shared between them.
pub struct Manager<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Manager<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Manager<M> {}

impl<M: Model> fmt::Debug for Manager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager").field("model", &M::NAME).finish()
    }
}

impl<M: Model> Default for Manager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Manager<M> {
    pub fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }

    /// A fresh query over every row.
    pub fn all(&self) -> QuerySet<M> {
        QuerySet::new()
    }

    pub fn filter(&self, filter: Filter) -> QuerySet<M> {
        self.all().filter(filter)
    }

    pub fn filter_all(&self, filters: impl IntoIterator<Item = Filter>) -> QuerySet<M> {
        self.all().filter_all(filters)
    }

    pub fn lookup(&self, key: &str, value: impl Into<Value>) -> QuerySet<M> {
        self.all().lookup(key, value)
    }

    /// Compile lookup-key conditions to a WHERE clause without building a query.
    pub fn conditions_to_sql<K, V>(&self, lookups: impl IntoIterator<Item = (K, V)>) -> String
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        crate::condition::conditions_to_sql(lookups)
    }

    pub async fn count(&self, conn: &impl Executor) -> OrmResult<i64> {
        self.all().count(conn).await
    }

    /// The single instance matching `filters`.
    pub async fn get(
        &self,
        conn: &impl Executor,
        filters: impl IntoIterator<Item = Filter>,
    ) -> OrmResult<M> {
        self.filter_all(filters).get(conn).await
    }

    pub async fn get_json(
        &self,
        conn: &impl Executor,
        filters: impl IntoIterator<Item = Filter>,
    ) -> OrmResult<String> {
        self.filter_all(filters).get_json(conn).await
    }

    /// Save `instance` and return it with its new id.
    pub async fn create(&self, conn: &impl Executor, instance: M) -> OrmResult<M> {
        instance.save(conn).await
    }

    /// Build an instance from a mapping (unknown keys dropped) and save it.
    pub async fn create_from_record(&self, conn: &impl Executor, record: &Record) -> OrmResult<M> {
        self.create(conn, M::from_record(record)?).await
    }

    /// Build an instance from a JSON object and save it.
    pub async fn create_from_json(&self, conn: &impl Executor, raw: &str) -> OrmResult<M> {
        self.create(conn, serializer::from_json(raw)?).await
    }

    /// Return the stored row with `instance.id()` if there is one, otherwise save
    /// `instance`.
    ///
    /// An existing row is returned unchanged; the fields of `instance` are not applied
    /// to it. An instance without an id is always created.
    pub async fn get_or_create(&self, conn: &impl Executor, instance: M) -> OrmResult<M> {
        if let Some(id) = instance.id() {
            let existing = self.filter(Filter::eq("id", id)).fetch(conn).await?;
            if let Some(found) = existing.into_iter().next() {
                tracing::debug!(model = M::NAME, id, "get_or_create: found existing row");
                return Ok(found);
            }
        }
        tracing::debug!(model = M::NAME, "get_or_create: creating row");
        self.create(conn, instance).await
    }

    pub async fn get_or_create_from_record(
        &self,
        conn: &impl Executor,
        record: &Record,
    ) -> OrmResult<M> {
        self.get_or_create(conn, M::from_record(record)?).await
    }

    pub async fn get_or_create_from_json(&self, conn: &impl Executor, raw: &str) -> OrmResult<M> {
        self.get_or_create(conn, serializer::from_json(raw)?).await
    }

    /// Bulk partial update of every row.
    pub async fn update(&self, conn: &impl Executor, values: &Record) -> OrmResult<u64> {
        self.all().update(conn, values).await
    }

    /// Full-row update of `instance` by its id.
    pub async fn update_instance(&self, conn: &impl Executor, instance: &M) -> OrmResult<u64> {
        instance.update(conn).await
    }

    /// Full-row update from a JSON object that carries the row's `id`; returns the
    /// instance that was written.
    pub async fn update_from_json(&self, conn: &impl Executor, raw: &str) -> OrmResult<M> {
        let instance: M = serializer::from_json(raw)?;
        instance.update(conn).await?;
        Ok(instance)
    }

    /// [`Manager::update_from_json`] returning the written row as JSON.
    pub async fn update_from_json_as_json(
        &self,
        conn: &impl Executor,
        raw: &str,
    ) -> OrmResult<String> {
        serializer::to_json(&self.update_from_json(conn, raw).await?)
    }

    /// Delete every row matching `filters` (at least one required).
    pub async fn delete(
        &self,
        conn: &impl Executor,
        filters: impl IntoIterator<Item = Filter>,
    ) -> OrmResult<u64> {
        self.filter_all(filters).delete(conn).await
    }

    /// Run arbitrary SQL and materialise the rows positionally against the schema.
    pub async fn execute_query(&self, conn: &impl Executor, raw_sql: &str) -> OrmResult<Vec<M>> {
        let rows = conn.fetch(raw_sql).await?;
        rows.into_iter().map(M::from_row).collect()
    }
}
