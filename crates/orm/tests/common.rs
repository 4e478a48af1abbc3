//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::Result;
use tabula_orm::{BufferedRows, Connection, DataType, Join, Rows, record};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

// Common test records used across multiple test files

record! {
    table = "users",
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct User {
        pub id: i64 => "primary_key; auto_increment",
        pub name: String => "not null",
        pub last_touch: i64 => "index",
        pub scratch: String => "-",
    }
}

record! {
    table = "employees",
    joins = [Join::left("departments", "employees.department_id = departments.id")],
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Employee {
        pub id: i64 => "primary_key",
        pub department_id: i64,
        pub department: String => "table: departments; column: name",
    }
}

record! {
    table = "tokens",
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Token {
        pub code: String => "primary_key",
        pub uses: u32,
    }
}

record! {
    table = "readings",
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Reading {
        pub ratio: f64 => "primary_key",
        pub label: String,
    }
}

record! {
    table = "notes",
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Note {
        pub body: String,
    }
}

/// Install a `debug` level subscriber once per test binary.
pub fn init_tracing() {
    let _ = Registry::default().with(EnvFilter::new("debug")).with(fmt::layer()).try_init();
}

/// A statement seen by [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<DataType>,
}

/// In-memory connection that records every statement and answers queries
/// from a queue of canned results.
#[derive(Default)]
pub struct Recorder {
    calls: RefCell<Vec<Call>>,
    results: RefCell<VecDeque<BufferedRows>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next query.
    pub fn respond(&self, columns: &[&str], rows: Vec<Vec<DataType>>) {
        let columns = columns.iter().map(ToString::to_string).collect();
        self.results.borrow_mut().push_back(BufferedRows::new(columns, rows));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn last(&self) -> Call {
        self.calls.borrow().last().cloned().expect("no statement recorded")
    }

    fn record(&self, sql: &str, params: &[DataType]) {
        self.calls.borrow_mut().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl Connection for Recorder {
    type Statement = String;

    fn prepare(&self, sql: &str) -> Result<String> {
        Ok(sql.to_string())
    }

    fn execute(&self, statement: &String, params: &[DataType]) -> Result<u64> {
        self.record(statement, params);
        Ok(1)
    }

    fn query(&self, sql: &str, params: &[DataType]) -> Result<Box<dyn Rows + '_>> {
        self.record(sql, params);
        let rows = self.results.borrow_mut().pop_front().unwrap_or_default();
        Ok(Box::new(rows))
    }
}

pub fn text(value: &str) -> DataType {
    DataType::Str(Some(value.to_string()))
}

/// Normalize SQL by collapsing whitespace.
fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize SQL for comparison by removing identifier quotes and normalizing whitespace.
/// Preserves quotes inside string literals.
fn canonicalize_sql(sql: &str) -> String {
    let mut cleaned = String::with_capacity(sql.len());
    let mut in_single_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_single_quote = !in_single_quote;
                cleaned.push(ch);
            }
            '"' if !in_single_quote => {}
            _ => cleaned.push(ch),
        }
    }

    normalize_sql(&cleaned)
}

/// Assert that SQL contains all expected fragments in order.
///
/// Identifier quotes and whitespace are ignored, and each fragment must
/// appear after the previous one.
#[allow(clippy::missing_panics_doc)]
pub fn assert_sql_contains(actual: &str, fragments: &[&str]) {
    let actual_canonical = canonicalize_sql(actual);
    let mut search_start = 0usize;

    for fragment in fragments {
        let fragment_canonical = canonicalize_sql(fragment);
        if fragment_canonical.is_empty() {
            continue;
        }

        if let Some(pos) = actual_canonical[search_start..].find(&fragment_canonical) {
            search_start += pos + fragment_canonical.len();
        } else {
            panic!(
                "expected SQL fragment `{fragment_canonical}` not found in `{actual_canonical}`"
            );
        }
    }
}
