//! Errors

use thiserror::Error;

use crate::value::FieldKind;

/// Configuration and mapping failures raised by the ORM itself.
///
/// Errors coming from a [`Connection`](crate::Connection) are passed through
/// as they are and never wrapped in this type.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The record has no field marked `primary_key`.
    #[error("table `{table}` has no primary key")]
    NoPrimaryKey { table: String },

    /// The primary key's kind cannot hold a generated identifier.
    #[error("primary key `{field}` of kind {kind} cannot receive a generated identifier")]
    UnsupportedPrimaryKey { field: &'static str, kind: FieldKind },

    /// An insert returned no row to read the identifier from.
    #[error("insert into `{table}` returned no identifier")]
    MissingIdentifier { table: String },

    /// A result column does not route to any field.
    #[error("result column `{column}` does not map to a field")]
    UnmappedColumn { column: String },

    /// A result row does not match the declared columns.
    #[error("row has {actual} values for {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    /// A NULL was read for a field that cannot hold it.
    #[error("unexpected NULL for a field of kind {kind}")]
    UnexpectedNull { kind: FieldKind },

    /// A value of the wrong type was read or assigned.
    #[error("expected a value of kind {expected}, found {found}")]
    TypeMismatch { expected: FieldKind, found: String },

    /// An integer does not fit the field's width.
    #[error("{value} is out of range for kind {kind}")]
    OutOfRange { kind: FieldKind, value: String },
}
