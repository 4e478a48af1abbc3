//! `SQLite` connection for tabula records.
//!
//! This is a lightweight implementation for development and tests. Rows are
//! read into memory before they are handed back.
//!
//! ```ignore
//! let conn = SqliteConnection::connect()?; // SQL_DATABASE or in-memory
//! let mut user = Model::new(User::default());
//! user.create_table(&conn)?;
//! conn.close()?;
//! ```

#![allow(clippy::significant_drop_tightening)]

use std::sync::Arc;

use anyhow::{Context, Result};
use fromenv::FromEnv;
use parking_lot::Mutex;
use rusqlite::Statement;
use rusqlite::types::{Value, ValueRef};
use tabula_orm::{BufferedRows, Connection, DataType, FieldKind, Rows};
use tracing::instrument;

/// Options used to connect to the SQL database.
///
/// Loaded from environment variables by [`ConnectOptions::load`].
#[derive(Debug, Clone, FromEnv)]
pub struct ConnectOptions {
    /// Database path or URI.
    #[env(from = "SQL_DATABASE", default = "file::memory:?cache=shared")]
    pub database: String,
}

impl ConnectOptions {
    /// Load options from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable cannot be read.
    pub fn load() -> Result<Self> {
        Self::from_env().finalize().context("issue loading connection options")
    }
}

/// A shared handle to an `SQLite` database.
///
/// Clones share the same underlying connection.
#[derive(Debug, Clone)]
pub struct SqliteConnection {
    // rusqlite::Connection isn't `Sync`
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteConnection {
    /// Open the database named by the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded or the database
    /// cannot be opened.
    pub fn connect() -> Result<Self> {
        Self::connect_with(ConnectOptions::load()?)
    }

    /// Open the database named by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    #[instrument]
    pub fn connect_with(options: ConnectOptions) -> Result<Self> {
        tracing::debug!("initializing SQLite connection to: {}", options.database);

        let conn = rusqlite::Connection::open(&options.database)
            .context("failed to open SQLite database")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Close the connection.
    ///
    /// When other handles are still alive only this handle is released; the
    /// database is closed when the last one goes.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` fails to close the database.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(conn) => {
                tracing::debug!("closing SQLite connection");
                conn.into_inner().close().map_err(|(_, e)| e).context("failed to close SQLite database")
            }
            Err(_shared) => {
                tracing::debug!("SQLite connection still shared, releasing handle");
                Ok(())
            }
        }
    }
}

impl Connection for SqliteConnection {
    type Statement = String;

    fn prepare(&self, sql: &str) -> Result<String> {
        let conn = self.conn.lock();
        conn.prepare_cached(sql).context("failed to prepare statement")?;
        Ok(sql.to_string())
    }

    fn execute(&self, statement: &String, params: &[DataType]) -> Result<u64> {
        tracing::debug!("executing statement: {}", statement);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(statement).context("failed to prepare statement")?;
        bind(&mut stmt, params)?;

        let rows_affected = stmt.raw_execute().context("failed to execute statement")?;
        Ok(rows_affected as u64)
    }

    fn query(&self, sql: &str, params: &[DataType]) -> Result<Box<dyn Rows + '_>> {
        tracing::debug!("executing query: {}", sql);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).context("failed to prepare statement")?;
        bind(&mut stmt, params)?;

        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        let mut rows = stmt.raw_query();
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next().context("failed to fetch row")? {
            let values = (0..columns.len())
                .map(|i| {
                    let value = row.get_ref(i).context("failed to get column value")?;
                    rusqlite_value_to_datatype(value)
                })
                .collect::<Result<Vec<_>>>()?;
            result_rows.push(values);
        }

        Ok(Box::new(BufferedRows::new(columns, result_rows)))
    }

    // STRING would give the column NUMERIC affinity and turn "007" into 7
    fn column_type(&self, kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Str => "TEXT",
            other => other.sql_type(),
        }
    }
}

// Parameters are bound by `$n` name, so placeholders may appear in any order
// or more than once.
fn bind(stmt: &mut Statement<'_>, params: &[DataType]) -> Result<()> {
    for (i, param) in params.iter().enumerate() {
        let name = format!("${}", i + 1);
        let index = stmt
            .parameter_index(&name)
            .context("failed to look up parameter")?
            .with_context(|| format!("statement has no parameter {name}"))?;
        let value = datatype_to_rusqlite_value(param)
            .with_context(|| format!("failed to convert parameter {name}"))?;
        stmt.raw_bind_parameter(index, value).with_context(|| format!("failed to bind parameter {name}"))?;
    }
    Ok(())
}

fn datatype_to_rusqlite_value(dt: &DataType) -> Result<Value> {
    let value = match dt {
        DataType::Boolean(Some(b)) => Value::Integer(i64::from(*b)),
        DataType::Int32(Some(i)) => Value::Integer(i64::from(*i)),
        DataType::Int64(Some(i)) => Value::Integer(*i),
        DataType::Uint32(Some(u)) => Value::Integer(i64::from(*u)),
        DataType::Uint64(Some(u)) => Value::Integer(
            i64::try_from(*u).with_context(|| format!("{u} does not fit an SQLite integer"))?,
        ),
        DataType::Float(Some(f)) => Value::Real(f64::from(*f)),
        DataType::Double(Some(f)) => Value::Real(*f),
        DataType::Str(Some(s)) => Value::Text(s.clone()),
        DataType::Binary(Some(b)) => Value::Blob(b.clone()),
        // All None variants map to NULL
        _ => Value::Null,
    };
    Ok(value)
}

fn rusqlite_value_to_datatype(value: ValueRef) -> Result<DataType> {
    match value {
        ValueRef::Null => Ok(DataType::Str(None)),
        ValueRef::Integer(i) => Ok(DataType::Int64(Some(i))),
        ValueRef::Real(f) => Ok(DataType::Double(Some(f))),
        ValueRef::Text(t) => {
            let s = std::str::from_utf8(t).context("invalid UTF-8 in text value")?;
            Ok(DataType::Str(Some(s.to_string())))
        }
        ValueRef::Blob(b) => Ok(DataType::Binary(Some(b.to_vec()))),
    }
}
