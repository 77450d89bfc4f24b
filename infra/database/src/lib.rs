//! # Database Infrastructure
//!
//! This crate provides a lightweight [SQLite](https://sqlite.org) layer built on
//! [`rusqlite`]: a builder-initialized connection handle plus a [`Query`] clause
//! builder that turns serializable condition structs into parameterized SQL.
//!
//! ## Key Features
//! - **Builder Pattern**: Fluent API for configuring the connection (`WAL`, busy timeout).
//! - **Resilient Startup**: Built-in health check retries with exponential backoff.
//! - **Struct-Driven Queries**: `LIKE` / `IN` / equality / time-range clauses derived
//!   from any `Serialize` type, with quoting of every identifier.
//!
//! ## Example
//!
//! ```rust
//! use toolx_database::{Database, DatabaseError, Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder().in_memory().init().await?;
//!
//!     db.batch("CREATE TABLE tab_user (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//!     let count = db.count(&Query::table("tab_user").build_count()?)?;
//!     assert_eq!(count, 0);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod query;

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
pub use error::{DatabaseError, DatabaseErrorExt};
use parking_lot::Mutex;
pub use query::{EXCLUDED_KEYS, Query, Statement};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter, types::ToSqlOutput};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};
use tracing::{info, warn};

/// Timestamp layout used for `created_at` range filters.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default wait on a locked database before giving up.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Current local time rendered with [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    connection: Mutex<Connection>,
    path: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(path = %self.path, "SQLite connection closed");
    }
}

/// Thread-safe SQLite handle with contextual error handling.
///
/// Cloning is cheap; all clones share one serialized connection.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }
}

/// A fluent builder for configuring and opening an SQLite database.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    path: Option<String>,
    busy_timeout: Option<Duration>,
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database file path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Opens a private in-memory database instead of a file.
    pub fn in_memory(mut self) -> Self {
        self.path = Some(":memory:".to_owned());
        self
    }

    /// How long a statement waits on a locked database. Defaults to 5s.
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Consumes the builder and opens the database.
    ///
    /// Applies `journal_mode=WAL` and `foreign_keys=ON`, then performs up to
    /// 3 health checks with exponential backoff (starting at 500ms) so a
    /// database file still being provisioned gets a chance to settle.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if no path was provided.
    /// * [`DatabaseError::Sqlite`] if opening or configuring the file fails.
    /// * [`DatabaseError::Connection`] if the health check keeps failing.
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let path = self.path.ok_or(DatabaseError::Validation {
            message: "Path is required".into(),
            context: None,
        })?;

        let connection = if path == ":memory:" {
            Connection::open_in_memory().context("Opening in-memory database")?
        } else {
            Connection::open(&path).context("Opening SQLite database")?
        };

        connection
            .busy_timeout(self.busy_timeout.unwrap_or(DEFAULT_BUSY_TIMEOUT))
            .context("Setting busy timeout")?;
        connection.pragma_update(None, "journal_mode", "WAL").context("Enabling WAL")?;
        connection.pragma_update(None, "foreign_keys", "ON").context("Enabling foreign keys")?;

        let database = Database {
            inner: Arc::new(DatabaseInner {
                connection: Mutex::new(connection),
                path: path.clone(),
            }),
        };

        // Connectivity & health check with retries
        let mut delay = Duration::from_millis(500);
        for attempt in 1..=3 {
            if database.health().is_ok() {
                break;
            }
            if attempt == 3 {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(path.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        info!(path = %database.inner.path, "SQLite connection established");

        Ok(database)
    }
}

impl Database {
    /// Runs a trivial query to verify the connection is usable.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] if the probe query fails.
    pub fn health(&self) -> Result<(), DatabaseError> {
        let connection = self.inner.connection.lock();
        connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .context("Health probe failed")?;
        Ok(())
    }

    /// Runs a `SELECT` and deserializes every row into `T`.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] for execution failures,
    /// [`DatabaseError::Serde`] when a row does not fit `T`.
    pub fn select<T: DeserializeOwned>(&self, statement: &Statement) -> Result<Vec<T>, DatabaseError> {
        self.rows(statement)?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Runs a `SELECT` and deserializes the first row, if any.
    ///
    /// # Errors
    /// Same conditions as [`Database::select`].
    pub fn first<T: DeserializeOwned>(&self, statement: &Statement) -> Result<Option<T>, DatabaseError> {
        match self.rows(statement)?.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Returns the first column of the first row, if any.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn select_value(&self, statement: &Statement) -> Result<Option<Value>, DatabaseError> {
        let connection = self.inner.connection.lock();
        let mut prepared = connection.prepare(&statement.sql).context("Preparing statement")?;
        let mut rows = prepared
            .query(params_from_iter(statement.params.iter().map(bind_value)))
            .context("Executing statement")?;
        match rows.next().context("Reading row")? {
            Some(row) => {
                let column = row.get_ref(0).context("Reading column")?;
                Ok(Some(column_to_value(column)))
            }
            None => Ok(None),
        }
    }

    /// Runs a `COUNT` statement and returns the integer result.
    ///
    /// # Errors
    /// [`DatabaseError::Internal`] when the query yields no integer.
    pub fn count(&self, statement: &Statement) -> Result<i64, DatabaseError> {
        self.select_value(statement)?.as_ref().and_then(Value::as_i64).ok_or_else(|| {
            DatabaseError::Internal {
                message: "Count query returned no integer".into(),
                context: Some(statement.sql.clone().into()),
            }
        })
    }

    /// Inserts one serializable row into `table`.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] when the row is not an object or is empty,
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<usize, DatabaseError> {
        let statement = query::build_insert(table, &query::object_from(row)?)?;
        self.execute(&statement)
    }

    /// Inserts one row, updating the `assign` columns on a `key` conflict.
    ///
    /// An empty `assign` list turns the conflict into a no-op.
    ///
    /// # Errors
    /// Same conditions as [`Database::insert`].
    pub fn upsert<T: Serialize>(
        &self,
        table: &str,
        row: &T,
        key: &str,
        assign: &[&str],
    ) -> Result<usize, DatabaseError> {
        let statement = query::build_upsert(table, &query::object_from(row)?, key, assign)?;
        self.execute(&statement)
    }

    /// Updates the rows matched by `query` with the serializable assignments.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] for empty assignments,
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn update<T: Serialize>(&self, query: &Query, assignments: &T) -> Result<usize, DatabaseError> {
        let statement = query.build_update(assignments)?;
        self.execute(&statement)
    }

    /// Deletes the rows matched by `query`.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn delete(&self, query: &Query) -> Result<usize, DatabaseError> {
        let statement = query.build_delete()?;
        self.execute(&statement)
    }

    /// Executes a single statement and returns the affected row count.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn execute(&self, statement: &Statement) -> Result<usize, DatabaseError> {
        let connection = self.inner.connection.lock();
        connection
            .execute(&statement.sql, params_from_iter(statement.params.iter().map(bind_value)))
            .context("Executing statement")
    }

    /// Executes a multi-statement script, e.g. schema setup.
    ///
    /// # Errors
    /// [`DatabaseError::Sqlite`] for execution failures.
    pub fn batch(&self, script: &str) -> Result<(), DatabaseError> {
        let connection = self.inner.connection.lock();
        connection.execute_batch(script).context("Executing batch script")
    }

    /// Runs `f` with the raw connection for anything the typed surface
    /// does not cover.
    pub fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> R) -> R {
        let connection = self.inner.connection.lock();
        f(&connection)
    }

    fn rows(&self, statement: &Statement) -> Result<Vec<Value>, DatabaseError> {
        let connection = self.inner.connection.lock();
        let mut prepared = connection.prepare(&statement.sql).context("Preparing statement")?;
        let columns: Vec<String> =
            prepared.column_names().into_iter().map(ToOwned::to_owned).collect();
        let mut rows = prepared
            .query(params_from_iter(statement.params.iter().map(bind_value)))
            .context("Executing statement")?;

        let mut collected = Vec::new();
        while let Some(row) = rows.next().context("Reading row")? {
            collected.push(row_to_value(row, &columns)?);
        }
        Ok(collected)
    }
}

/// Maps a JSON parameter onto an SQLite binding.
///
/// Structured values (arrays, nested objects) are stored as JSON text.
fn bind_value(value: &Value) -> ToSqlOutput<'_> {
    match value {
        Value::Null => ToSqlOutput::Owned(SqlValue::Null),
        Value::Bool(flag) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number.as_i64().map_or_else(
            || ToSqlOutput::Owned(SqlValue::Real(number.as_f64().unwrap_or_default())),
            |integer| ToSqlOutput::Owned(SqlValue::Integer(integer)),
        ),
        Value::String(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
        other => ToSqlOutput::Owned(SqlValue::Text(other.to_string())),
    }
}

/// Maps an SQLite column onto JSON. Blobs come back base64-encoded.
fn column_to_value(column: ValueRef<'_>) -> Value {
    match column {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Number::from_f64(real).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(BASE64.encode(blob)),
    }
}

fn row_to_value(row: &rusqlite::Row<'_>, columns: &[String]) -> Result<Value, DatabaseError> {
    let mut object = Map::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        let value = row.get_ref(index).context("Reading column")?;
        object.insert(column.clone(), column_to_value(value));
    }
    Ok(Value::Object(object))
}
