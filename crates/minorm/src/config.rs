//! Connection and SQL-logging configuration.

use crate::error::{OrmError, OrmResult};
use tracing::Level;

/// Environment variable holding the connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable toggling SQL logging (`0` / `false` disables it).
pub const LOG_SQL_ENV: &str = "MINORM_LOG_SQL";

/// Configuration for [`Database`](crate::Database).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Whether statements are logged before execution.
    pub log_sql: bool,
    /// Tracing event level for logged statements.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl DatabaseConfig {
    /// Configuration for `url` with logging on at DEBUG, truncated to 200.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            log_sql: true,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Read `DATABASE_URL` (required) and `MINORM_LOG_SQL` (optional).
    pub fn from_env() -> OrmResult<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| OrmError::Connection(format!("{DATABASE_URL_ENV} is not set")))?;
        let mut config = Self::new(url);
        if let Ok(flag) = std::env::var(LOG_SQL_ENV) {
            config.log_sql = parse_flag(&flag);
        }
        Ok(config)
    }

    /// Enable or disable SQL logging.
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
