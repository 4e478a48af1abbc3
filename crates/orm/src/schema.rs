//! Table metadata extracted from a record's field descriptors.
//!
//! Extraction runs once per binding. It decides each field's column name and
//! owning table, finds the primary key, and builds the selector index used to
//! route `"table.column"` result columns back to fields.

use std::collections::HashMap;

use anyhow::Result;

use crate::error::Error;
use crate::record::{FieldDef, Record};
use crate::value::{DataType, FieldValue};

/// Default column name for a field identifier.
///
/// Mixed and camel case identifiers become lower snake case: an underscore
/// goes before each capitalised word and between a lower-case letter or digit
/// and the capital that follows it. Runs of underscores collapse to one.
///
/// ```ignore
/// assert_eq!(column_name("UserID"), "user_id");
/// assert_eq!(column_name("HTTPStatus"), "http_status");
/// assert_eq!(column_name("lastTouch"), "last_touch");
/// ```
#[must_use]
pub fn column_name(field: &str) -> String {
    let chars: Vec<char> = field.chars().collect();
    let mut snake = String::with_capacity(field.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let starts_word = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let follows_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            if starts_word || follows_lower {
                snake.push('_');
            }
        }
        snake.extend(ch.to_lowercase());
    }

    let mut collapsed = String::with_capacity(snake.len());
    for ch in snake.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

/// A persisted field together with its resolved column and table.
pub struct ColumnMeta<R> {
    field: FieldDef<R>,
    column: String,
    table: String,
}

impl<R> ColumnMeta<R> {
    /// Field identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.field.name
    }

    /// Column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Table the column belongs to.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The field descriptor.
    #[must_use]
    pub const fn field(&self) -> &FieldDef<R> {
        &self.field
    }

    /// `"table.column"`, the key result columns are routed by.
    #[must_use]
    pub fn selector(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }

    /// Current value of the field.
    pub fn value(&self, record: &R) -> FieldValue {
        (self.field.get)(record)
    }

    /// Whether the field holds something other than its kind's zero value.
    pub fn is_set(&self, record: &R) -> bool {
        !self.value(record).is_zero()
    }

    /// Write a database value into the field.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be converted to the field's kind.
    pub fn assign(&self, record: &mut R, data: &DataType) -> Result<()> {
        let value = FieldValue::from_data(self.field.kind, data)?;
        (self.field.set)(record, value)
    }
}

/// Column, table and primary key metadata for a record type.
pub struct Schema<R> {
    table: String,
    columns: Vec<ColumnMeta<R>>,
    primary_key: Option<usize>,
    selectors: HashMap<String, usize>,
}

impl<R: Record> Schema<R> {
    /// Extract the schema of `R` for its declared table.
    #[must_use]
    pub fn of() -> Self {
        Self::extract(R::TABLE, R::fields())
    }
}

impl<R> Schema<R> {
    /// Extract a schema from field descriptors.
    ///
    /// Excluded fields are dropped. When more than one field is marked as
    /// primary key the first one is kept and a warning is logged.
    #[must_use]
    pub fn extract(table: &str, fields: Vec<FieldDef<R>>) -> Self {
        let mut columns = Vec::with_capacity(fields.len());
        let mut primary_key = None;
        let mut selectors = HashMap::new();

        for field in fields {
            if field.options.excluded {
                continue;
            }

            let column = field.options.column.clone().unwrap_or_else(|| column_name(field.name));
            let owner = field.options.table.clone().unwrap_or_else(|| table.to_string());

            if field.options.primary_key {
                if let Some(existing) = primary_key {
                    let existing: &ColumnMeta<R> = &columns[existing];
                    tracing::warn!(
                        table,
                        kept = existing.name(),
                        ignored = field.name,
                        "multiple primary keys declared, only one is supported"
                    );
                } else {
                    primary_key = Some(columns.len());
                }
            }

            let meta = ColumnMeta {
                field,
                column,
                table: owner,
            };
            selectors.insert(meta.selector(), columns.len());
            columns.push(meta);
        }

        Self {
            table: table.to_string(),
            columns,
            primary_key,
            selectors,
        }
    }

    /// The record's own table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every persisted field, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnMeta<R>] {
        &self.columns
    }

    /// Persisted fields stored in the record's own table.
    pub fn own_columns(&self) -> impl Iterator<Item = &ColumnMeta<R>> {
        self.columns.iter().filter(|meta| meta.table == self.table)
    }

    /// Look a persisted field up by name.
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&ColumnMeta<R>> {
        self.columns.iter().find(|meta| meta.name() == field)
    }

    /// Look a persisted field up by its `"table.column"` selector.
    #[must_use]
    pub fn by_selector(&self, selector: &str) -> Option<&ColumnMeta<R>> {
        self.selectors.get(selector).map(|&index| &self.columns[index])
    }

    /// The primary key field, if one was declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnMeta<R>> {
        self.primary_key.map(|index| &self.columns[index])
    }

    /// The primary key field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrimaryKey`] if none was declared.
    pub fn require_primary_key(&self) -> Result<&ColumnMeta<R>> {
        self.primary_key().ok_or_else(|| {
            Error::NoPrimaryKey {
                table: self.table.clone(),
            }
            .into()
        })
    }

    /// Whether `meta` is the designated primary key.
    #[must_use]
    pub fn is_primary_key(&self, meta: &ColumnMeta<R>) -> bool {
        self.primary_key().is_some_and(|pk| std::ptr::eq(pk, meta))
    }
}
