//! Executor trait: the boundary between the query builder and a database connection.

use crate::error::{OrmError, OrmResult};
use crate::row::RowExt;
use crate::sql::Dialect;
use crate::value::Value;

/// A fetched row: one [`Value`] per selected column, in column order.
pub type Row = Vec<Value>;

/// Executes raw SQL text.
///
/// Query builders hand fully rendered statements to an executor and never bind
/// parameters. Every call is a single round trip that returns the complete result.
///
/// Implemented for `tokio_postgres::Client` and for [`Database`](crate::Database); tests
/// can supply their own implementation.
pub trait Executor: Send + Sync {
    /// SQL flavour this executor speaks.
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    /// Execute a query and return all rows.
    fn fetch(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Execute an INSERT and return the id the backend assigned to the new row.
    fn insert(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<i64>> + Send;

    /// Execute a query whose first column of the first row is an integer (e.g. `COUNT(*)`).
    fn fetch_scalar(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<i64>> + Send {
        async move {
            let rows = self.fetch(sql).await?;
            rows.into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .and_then(|value| value.as_i64())
                .ok_or_else(|| OrmError::not_found("Expected a scalar result, got none"))
        }
    }
}

impl Executor for tokio_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch(&self, sql: &str) -> OrmResult<Vec<Row>> {
        let rows = tokio_postgres::Client::query(self, sql, &[]).await?;
        rows.iter().map(|row| row.to_values()).collect()
    }

    async fn execute(&self, sql: &str) -> OrmResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, &[]).await?)
    }

    async fn insert(&self, sql: &str) -> OrmResult<i64> {
        let rows = tokio_postgres::Client::query(self, sql, &[]).await?;
        let row = rows
            .first()
            .ok_or_else(|| OrmError::Other("INSERT returned no id".to_string()))?;
        row.to_values()?
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| OrmError::decode("id", "INSERT did not return an integer id"))
    }
}
