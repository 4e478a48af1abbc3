use anyhow::Result;
use sea_query::{Alias, ColumnRef, Expr, Order, SimpleExpr};

use crate::join::Join;
use crate::query::{Query, QueryBuilder, column, table_column};
use crate::record::Record;
use crate::schema::{Schema, column_name};
use crate::value::{DataType, FieldValue, values_to_datatypes};

/// Description of a single SELECT.
///
/// A builder is a plain value: it is built fresh for each query and nothing
/// carries over from one query to the next.
///
/// ```ignore
/// let select = SelectBuilder::new()
///     .r#where("users.name = $1")
///     .bind("ada")
///     .order_by_desc("LastTouch")
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    filters: Vec<String>,
    params: Vec<FieldValue>,
    order: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    joins: Vec<Join>,
}

impl SelectBuilder {
    /// Creates a new SELECT query builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw WHERE condition. Several conditions are combined with AND.
    ///
    /// The text is used verbatim. Values belong in `$n` placeholders supplied
    /// with [`bind`](Self::bind), never interpolated into the condition.
    #[must_use]
    pub fn r#where(mut self, condition: impl Into<String>) -> Self {
        self.filters.push(condition.into());
        self
    }

    /// Supplies the value for the next `$n` placeholder in the WHERE
    /// condition.
    #[must_use]
    pub fn bind(mut self, value: impl Into<FieldValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Adds ascending ORDER BY on a field (or column) name.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), Order::Asc));
        self
    }

    /// Adds descending ORDER BY on a field (or column) name.
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), Order::Desc));
        self
    }

    /// Sets the maximum number of rows to return. Zero means no limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of rows to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a JOIN clause to the query, after the record's own joins.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Build the SELECT for the record described by `schema`.
    ///
    /// Every persisted field is projected as `table.column AS "table.column"`.
    /// The statement itself carries no parameters, so the WHERE condition's
    /// placeholders start at `$1`.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound value cannot be converted to a
    /// [`DataType`].
    pub fn build<R: Record>(&self, schema: &Schema<R>) -> Result<Query> {
        let mut statement = sea_query::Query::select();

        for meta in schema.columns() {
            statement.expr_as(
                SimpleExpr::Column(table_column(meta.table(), meta.column())),
                Alias::new(meta.selector()),
            );
        }

        statement.from(Alias::new(schema.table()));

        for join in R::joins().iter().chain(&self.joins) {
            let table = Alias::new(join.table());
            let on = Expr::cust(join.on());
            if let Some(alias) = join.alias_name() {
                statement.join_as(join.join_type(), table, Alias::new(alias), on);
            } else {
                statement.join(join.join_type(), table, on);
            }
        }

        if let Some(condition) = self.condition() {
            statement.and_where(Expr::cust(condition));
        }

        for (field, order) in &self.order {
            statement.order_by(order_column(schema, field), order.clone());
        }

        let (mut sql, values) = statement.build(QueryBuilder::default());

        // literals keep the caller's placeholder numbering intact
        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset.filter(|&n| n > 0) {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let mut params = values_to_datatypes(values)?;
        params.extend(self.params.iter().cloned().map(DataType::from));

        tracing::debug!(
            table = schema.table(),
            sql = %sql,
            param_count = params.len(),
            "SelectBuilder generated SQL"
        );

        Ok(Query { sql, params })
    }

    fn condition(&self) -> Option<String> {
        match self.filters.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(many.iter().map(|f| format!("({f})")).collect::<Vec<_>>().join(" AND ")),
        }
    }
}

fn order_column<R>(schema: &Schema<R>, field: &str) -> ColumnRef {
    schema.column(field).map_or_else(
        || column(&column_name(field)),
        |meta| table_column(meta.table(), meta.column()),
    )
}
