//! Record-to-table mapping for SQL databases.
//!
//! Declares how a plain struct maps onto a table, tracks which of its fields
//! changed since it was last saved or loaded, and generates the SQL to insert,
//! update, delete, select and create it. Statements are run through a
//! [`Connection`] supplied by the caller.
//!
//! # Quick Start
//!
//! ## Declare a Record
//!
//! ```ignore
//! record! {
//!     table = "users",
//!     #[derive(Debug, Default)]
//!     pub struct User {
//!         pub id: i64 => "primary_key; auto_increment",
//!         pub name: String => "not null",
//!         pub last_touch: i64 => "index",
//!         pub scratch: String => "-",
//!     }
//! }
//! ```
//!
//! Each field takes an option string of `;` separated options, `name` or
//! `name: value`:
//!
//! | option | effect |
//! |---|---|
//! | `-` (alone) | field is not persisted |
//! | `column: c` | column name, instead of the snake cased field name |
//! | `table: t` | column lives in another (joined) table |
//! | `primary_key` | the record's key |
//! | `auto_increment` | `SERIAL` column |
//! | `type: T` | column type |
//! | `raw: DEF` | whole column definition |
//! | `unique`, `not null`, `default: X` | constraints |
//! | `index`, `index: name` | secondary index |
//!
//! ## Save, Fetch and Delete
//!
//! ```ignore
//! let mut user = Model::new(User { name: "a".to_string(), ..User::default() });
//! user.create_table(&conn)?;
//! user.save(&conn)?; // INSERT ... RETURNING id
//!
//! user.name = "b".to_string();
//! user.save(&conn)?; // UPDATE users SET name = $1 WHERE id = $2
//!
//! let select = SelectBuilder::new().r#where("users.id = $1").bind(user.id);
//! user.fetch(&conn, &select)?;
//!
//! user.each(&conn, &SelectBuilder::new().order_by_desc("last_touch"), |row| {
//!     match row {
//!         Ok(user) => println!("{}", user.name),
//!         Err(err) => eprintln!("{err}"),
//!     }
//!     ControlFlow::Continue(())
//! });
//!
//! user.delete(&conn)?;
//! ```
//!
//! ## Joins
//!
//! ```ignore
//! record! {
//!     table = "employees",
//!     joins = [Join::left("departments", "employees.department_id = departments.id")],
//!     pub struct Employee {
//!         pub id: i64 => "primary_key",
//!         pub department_id: i64,
//!         pub department: String => "table: departments; column: name",
//!     }
//! }
//! ```
//!
//! Joined columns are read on fetch and never written by `save`.

mod connection;
mod ddl;
mod delete;
mod error;
mod insert;
mod join;
mod materialize;
mod model;
mod options;
mod query;
mod record;
mod schema;
mod select;
mod tracker;
mod update;
mod value;

pub mod tag;

pub use connection::{BufferedRows, Connection, Rows};
pub use ddl::{create_table, create_table_with, drop_table};
pub use delete::DeleteBuilder;
pub use error::Error;
pub use insert::InsertBuilder;
pub use join::{Join, JoinKind};
pub use materialize::Targets;
pub use model::Model;
pub use options::{FieldOptions, IndexSpec};
pub use query::{Query, QueryBuilder};
pub use record::{FieldDef, Getter, Record, Setter};
pub use schema::{ColumnMeta, Schema, column_name};
pub use select::SelectBuilder;
pub use tracker::Snapshot;
pub use update::UpdateBuilder;
pub use value::{Column, DataType, FieldKind, FieldValue};

// Re-exports for `record` macro use only.
#[doc(hidden)]
pub mod __private {
    pub use anyhow::Result;
}
