use anyhow::Result;
use sea_query::{Alias, Expr, SimpleExpr, Value};

use crate::query::{Query, QueryBuilder, column};
use crate::schema::Schema;
use crate::tracker::Snapshot;
use crate::value::values_to_datatypes;

/// Builder for the UPDATE that writes a record's changed fields.
pub struct UpdateBuilder<'a, R> {
    schema: &'a Schema<R>,
    record: &'a R,
    snapshot: &'a Snapshot,
}

impl<'a, R> UpdateBuilder<'a, R> {
    /// Creates an UPDATE builder comparing `record` against `snapshot`.
    #[must_use]
    pub const fn new(schema: &'a Schema<R>, record: &'a R, snapshot: &'a Snapshot) -> Self {
        Self {
            schema,
            record,
            snapshot,
        }
    }

    /// Build the UPDATE query, keyed by primary key.
    ///
    /// Only changed fields of the record's own table are written. Returns
    /// `None` when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrimaryKey`](crate::Error::NoPrimaryKey) when the
    /// record has no primary key.
    pub fn build(self) -> Result<Option<Query>> {
        let table = self.schema.table();
        let pk = self.schema.require_primary_key()?;

        let changes: Vec<_> = self
            .schema
            .own_columns()
            .filter(|meta| self.snapshot.is_changed(self.schema, self.record, meta.name()))
            .map(|meta| {
                let value: Value = meta.value(self.record).into();
                (Alias::new(meta.column()), SimpleExpr::Value(value))
            })
            .collect();

        if changes.is_empty() {
            tracing::debug!(table, "no changed fields, skipping UPDATE");
            return Ok(None);
        }

        let key: Value = pk.value(self.record).into();
        let mut statement = sea_query::Query::update();
        statement
            .table(Alias::new(table))
            .values(changes)
            .and_where(Expr::col(column(pk.column())).eq(key));

        let (sql, values) = statement.build(QueryBuilder::default());
        let params = values_to_datatypes(values)?;

        tracing::debug!(
            table,
            sql = %sql,
            param_count = params.len(),
            "UpdateBuilder generated SQL"
        );

        Ok(Some(Query { sql, params }))
    }
}
