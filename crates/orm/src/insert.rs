use anyhow::Result;
use sea_query::{Alias, SimpleExpr, Value};

use crate::error::Error;
use crate::query::{Query, QueryBuilder};
use crate::schema::Schema;
use crate::value::values_to_datatypes;

/// Builder for the INSERT that stores a new record.
///
/// Every field of the record's own table is written except the primary key,
/// which the database generates and hands back through `RETURNING`.
pub struct InsertBuilder<'a, R> {
    schema: &'a Schema<R>,
    record: &'a R,
}

impl<'a, R> InsertBuilder<'a, R> {
    /// Creates an INSERT builder for `record`.
    #[must_use]
    pub const fn new(schema: &'a Schema<R>, record: &'a R) -> Self {
        Self { schema, record }
    }

    /// Build the INSERT query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrimaryKey`] when the record has no primary key and
    /// [`Error::UnsupportedPrimaryKey`] when the key cannot hold a generated
    /// identifier.
    pub fn build(self) -> Result<Query> {
        let table = self.schema.table();
        let pk = self.schema.require_primary_key()?;
        if !pk.field().kind.accepts_identifier() {
            return Err(Error::UnsupportedPrimaryKey {
                field: pk.name(),
                kind: pk.field().kind,
            }
            .into());
        }

        let (columns, row): (Vec<_>, Vec<_>) = self
            .schema
            .own_columns()
            .filter(|meta| !self.schema.is_primary_key(meta))
            .map(|meta| {
                let value: Value = meta.value(self.record).into();
                (Alias::new(meta.column()), SimpleExpr::Value(value))
            })
            .unzip();

        let (sql, values) = if columns.is_empty() {
            (format!(r#"INSERT INTO "{table}" DEFAULT VALUES RETURNING "{}""#, pk.column()), None)
        } else {
            let mut statement = sea_query::Query::insert();
            statement
                .into_table(Alias::new(table))
                .columns(columns)
                .values(row)?
                .returning_col(Alias::new(pk.column()));
            let (sql, values) = statement.build(QueryBuilder::default());
            (sql, Some(values))
        };
        let params = values.map(values_to_datatypes).transpose()?.unwrap_or_default();

        tracing::debug!(
            table,
            sql = %sql,
            param_count = params.len(),
            "InsertBuilder generated SQL"
        );

        Ok(Query { sql, params })
    }
}
