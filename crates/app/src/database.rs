//! Database connection management

use std::{error::Error as StdError, str::FromStr};

use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or the transaction fails to start.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error when a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

fn column_decode(
    column: &str,
    source: impl StdError + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

/// Reads a text column holding a canonical enumeration value.
pub(crate) fn try_get_parsed<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let value: String = row.try_get(column)?;

    value.parse().map_err(|e| column_decode(column, e))
}

pub(crate) fn try_get_parsed_opt<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    row.try_get::<Option<String>, _>(column)?
        .map(|value| value.parse().map_err(|e| column_decode(column, e)))
        .transpose()
}

/// Reads a `BIGINT` money or amount column.
pub(crate) fn try_get_u64(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| column_decode(column, e))
}

pub(crate) fn try_get_u64_opt(row: &PgRow, column: &str) -> Result<Option<u64>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(column)?
        .map(|value| u64::try_from(value).map_err(|e| column_decode(column, e)))
        .transpose()
}

/// Reads an `INTEGER` count column.
pub(crate) fn try_get_u32(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| column_decode(column, e))
}

pub(crate) fn try_get_u32_opt(row: &PgRow, column: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(column)?
        .map(|value| u32::try_from(value).map_err(|e| column_decode(column, e)))
        .transpose()
}

/// Converts an amount for binding.
pub(crate) fn to_i64(value: u64, column: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| column_decode(column, e))
}

/// Converts a count for binding.
pub(crate) fn to_i32(value: u32, column: &str) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| column_decode(column, e))
}
