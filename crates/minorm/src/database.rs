//! An explicit, owned connection handle.
//!
//! ```ignore
//! use minorm::{Database, DatabaseConfig};
//!
//! let db = Database::connect(DatabaseConfig::from_env()?).await?;
//! let n = HelperModel::objects().count(&db).await?;
//! db.close().await?;
//! ```

use crate::client::{Executor, Row};
use crate::config::DatabaseConfig;
use crate::error::{OrmError, OrmResult};
use crate::monitor::SqlLogger;
use crate::sql::Dialect;
use tokio::task::JoinHandle;

/// A single PostgreSQL connection plus its background driver task.
///
/// Every statement run through it is logged under the `minorm.sql` target when
/// [`DatabaseConfig::log_sql`] is on.
pub struct Database {
    client: tokio_postgres::Client,
    connection: JoinHandle<()>,
    logger: Option<SqlLogger>,
    config: DatabaseConfig,
}

impl Database {
    /// Connect with `NoTls` and spawn the connection task on the current runtime.
    pub async fn connect(config: DatabaseConfig) -> OrmResult<Self> {
        let (client, connection) = tokio_postgres::connect(&config.url, tokio_postgres::NoTls)
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "minorm.sql", error = %e, "connection error");
            }
        });

        let logger = config.log_sql.then(|| {
            let logger = SqlLogger::new().level(config.log_level);
            match config.max_sql_length {
                Some(max) => logger.max_sql_length(max),
                None => logger.no_truncate(),
            }
        });

        tracing::debug!(target: "minorm.sql", "connected");
        Ok(Self {
            client,
            connection,
            logger,
            config,
        })
    }

    /// Whether the backend connection is still open.
    pub fn is_connected(&self) -> bool {
        !self.client.is_closed() && !self.connection.is_finished()
    }

    /// The underlying client, bypassing statement logging.
    pub fn client(&self) -> &tokio_postgres::Client {
        &self.client
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Drop the client and wait for the connection task to finish.
    pub async fn close(self) -> OrmResult<()> {
        let Self {
            client, connection, ..
        } = self;
        drop(client);
        connection
            .await
            .map_err(|e| OrmError::Connection(format!("connection task failed: {e}")))
    }

    fn log(&self, sql: &str) {
        if let Some(logger) = &self.logger {
            logger.log(sql);
        }
    }
}

impl Executor for Database {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch(&self, sql: &str) -> OrmResult<Vec<Row>> {
        self.log(sql);
        Executor::fetch(&self.client, sql).await
    }

    async fn execute(&self, sql: &str) -> OrmResult<u64> {
        self.log(sql);
        Executor::execute(&self.client, sql).await
    }

    async fn insert(&self, sql: &str) -> OrmResult<i64> {
        self.log(sql);
        Executor::insert(&self.client, sql).await
    }
}
