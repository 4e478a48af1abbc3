//! Per-field mapping configuration.

use crate::tag::{self, PRESENT};

/// How a column's index is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSpec {
    /// Named `<table>_<column>_idx`.
    Auto,
    /// Explicit index name.
    Named(String),
}

/// Mapping options for a single record field.
///
/// Built either from an option string (see [`FieldOptions::from_tag`]) or with
/// the builder methods:
///
/// ```ignore
/// let options = FieldOptions::new().primary_key().auto_increment();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// The field is not persisted at all.
    pub excluded: bool,
    /// Column name override.
    pub column: Option<String>,
    /// Table the column belongs to, when not the record's own table.
    pub table: Option<String>,
    /// The field is the record's primary key.
    pub primary_key: bool,
    /// The column is generated by the database (`SERIAL`).
    pub auto_increment: bool,
    /// Column type override.
    pub sql_type: Option<String>,
    /// Complete column definition, used verbatim after the column name.
    pub raw: Option<String>,
    /// `UNIQUE` constraint.
    pub unique: bool,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// `DEFAULT` expression.
    pub default: Option<String>,
    /// Secondary index on the column.
    pub index: Option<IndexSpec>,
}

impl FieldOptions {
    /// Options for a plain column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a field that is never persisted.
    #[must_use]
    pub fn excluded() -> Self {
        Self {
            excluded: true,
            ..Self::default()
        }
    }

    /// Interpret an option string.
    ///
    /// The string `-` on its own excludes the field. Unknown options are
    /// ignored.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim() == PRESENT {
            return Self::excluded();
        }

        let mut options = tag::parse(tag);
        let value = |v: String| (v != PRESENT && !v.is_empty()).then_some(v);

        Self {
            excluded: false,
            column: options.remove("column").and_then(value),
            table: options.remove("table").and_then(value),
            primary_key: options.contains_key("primary_key"),
            auto_increment: options.contains_key("auto_increment"),
            sql_type: options.remove("type").and_then(value),
            raw: options.remove("raw").and_then(value),
            unique: options.contains_key("unique"),
            not_null: options.contains_key("not null"),
            default: options.remove("default").and_then(value),
            index: options
                .remove("index")
                .map(|name| value(name).map_or(IndexSpec::Auto, IndexSpec::Named)),
        }
    }

    /// Override the column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Associate the field with another table.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Mark the field as primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the column as database generated.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Override the column type.
    #[must_use]
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Supply the whole column definition.
    #[must_use]
    pub fn raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Add a `UNIQUE` constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Add a `NOT NULL` constraint.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Set the `DEFAULT` expression.
    #[must_use]
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Index the column under the generated name.
    #[must_use]
    pub fn index(mut self) -> Self {
        self.index = Some(IndexSpec::Auto);
        self
    }

    /// Index the column under an explicit name.
    #[must_use]
    pub fn index_named(mut self, name: impl Into<String>) -> Self {
        self.index = Some(IndexSpec::Named(name.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_marker() {
        assert!(FieldOptions::from_tag("-").excluded);
        assert!(FieldOptions::from_tag(" - ").excluded);
        assert!(!FieldOptions::from_tag("-; unique").excluded);
        assert!(!FieldOptions::from_tag("").excluded);
    }

    #[test]
    fn full_tag() {
        let options = FieldOptions::from_tag(
            "primary_key; auto_increment; column: uid; type: BIGINT; unique; not null; \
             default: 7; index: by_uid",
        );

        let expected = FieldOptions::new()
            .primary_key()
            .auto_increment()
            .column("uid")
            .sql_type("BIGINT")
            .unique()
            .not_null()
            .default_value("7")
            .index_named("by_uid");
        assert_eq!(options, expected);
    }

    #[test]
    fn unnamed_index() {
        assert_eq!(FieldOptions::from_tag("index").index, Some(IndexSpec::Auto));
        assert_eq!(FieldOptions::from_tag("index:").index, Some(IndexSpec::Auto));
        assert_eq!(FieldOptions::from_tag("unique").index, None);
    }

    #[test]
    fn flag_without_value_is_not_an_override() {
        let options = FieldOptions::from_tag("column; table");
        assert_eq!(options.column, None);
        assert_eq!(options.table, None);
    }
}
