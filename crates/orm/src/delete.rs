use anyhow::Result;
use sea_query::{Alias, Expr, Value};

use crate::query::{Query, QueryBuilder, column};
use crate::schema::Schema;
use crate::value::values_to_datatypes;

/// Builder for the DELETE of a single record, keyed by primary key.
pub struct DeleteBuilder<'a, R> {
    schema: &'a Schema<R>,
    record: &'a R,
}

impl<'a, R> DeleteBuilder<'a, R> {
    /// Creates a DELETE builder for `record`.
    #[must_use]
    pub const fn new(schema: &'a Schema<R>, record: &'a R) -> Self {
        Self { schema, record }
    }

    /// Build the DELETE query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrimaryKey`](crate::Error::NoPrimaryKey) when the
    /// record has no primary key.
    pub fn build(self) -> Result<Query> {
        let table = self.schema.table();
        let pk = self.schema.require_primary_key()?;
        let key: Value = pk.value(self.record).into();

        let mut statement = sea_query::Query::delete();
        statement.from_table(Alias::new(table)).and_where(Expr::col(column(pk.column())).eq(key));

        let (sql, values) = statement.build(QueryBuilder::default());
        let params = values_to_datatypes(values)?;

        tracing::debug!(
            table,
            sql = %sql,
            param_count = params.len(),
            "DeleteBuilder generated SQL"
        );

        Ok(Query { sql, params })
    }
}
