//! The database boundary.
//!
//! The ORM only generates statements; running them is left to a
//! [`Connection`]. Implementations own connection setup and teardown and
//! report their own errors, which are returned to callers unchanged.

use std::collections::VecDeque;

use anyhow::Result;

use crate::value::{DataType, FieldKind};

/// An open database handle.
pub trait Connection {
    /// A statement prepared by [`prepare`](Self::prepare).
    type Statement;

    /// Prepare `sql` for execution.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the statement is invalid.
    fn prepare(&self, sql: &str) -> Result<Self::Statement>;

    /// Execute a prepared statement, returning the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if execution fails.
    fn execute(&self, statement: &Self::Statement, params: &[DataType]) -> Result<u64>;

    /// Run a query and return its result rows.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the query fails.
    fn query(&self, sql: &str, params: &[DataType]) -> Result<Box<dyn Rows + '_>>;

    /// Column type for fields that declare neither `raw` nor `type`.
    ///
    /// Defaults to [`FieldKind::sql_type`].
    fn column_type(&self, kind: FieldKind) -> &'static str {
        kind.sql_type()
    }
}

/// A result cursor.
pub trait Rows {
    /// Result column names, in the order values appear in each row.
    fn columns(&self) -> &[String];

    /// Advance to the next row. `None` once the rows are exhausted.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the row cannot be read.
    fn next_row(&mut self) -> Result<Option<Vec<DataType>>>;
}

/// Rows already read into memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<DataType>>,
}

impl BufferedRows {
    /// Wrap fully read result rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: impl IntoIterator<Item = Vec<DataType>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows not yet returned.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Rows for BufferedRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<DataType>>> {
        Ok(self.rows.pop_front())
    }
}
