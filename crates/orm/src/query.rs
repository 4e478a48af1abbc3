use sea_query::backend::{
    EscapeBuilder, OperLeftAssocDecider, PrecedenceDecider, QuotedBuilder, TableRefBuilder,
};
use sea_query::prepare::SqlWriter;
use sea_query::{Alias, BinOper, ColumnRef, IntoIden, Oper, Quote, SimpleExpr, SubQueryStatement, Value};

use crate::value::DataType;

/// A generated statement and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// SQL text with `$n` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub params: Vec<DataType>,
}

/// Renders sea-query statements with double-quoted identifiers and numbered
/// `$n` placeholders.
pub struct QueryBuilder {
    /// Identifier quote character.
    pub quote: Quote,
    /// Placeholder prefix, `$` or `?`.
    pub placeholder: &'static str,
    /// Whether placeholders carry their position, as in `$1`.
    pub numbered: bool,
}

impl Default for QueryBuilder {
    // accepted by both Postgres and SQLite
    fn default() -> Self {
        Self {
            quote: Quote::new(b'"'),
            placeholder: "$",
            numbered: true,
        }
    }
}

impl QuotedBuilder for QueryBuilder {
    fn quote(&self) -> Quote {
        self.quote
    }
}

impl EscapeBuilder for QueryBuilder {}

impl TableRefBuilder for QueryBuilder {}

impl OperLeftAssocDecider for QueryBuilder {
    fn well_known_left_associative(&self, op: &BinOper) -> bool {
        matches!(
            op,
            BinOper::And | BinOper::Or | BinOper::Add | BinOper::Sub | BinOper::Mul | BinOper::Mod
        )
    }
}

impl PrecedenceDecider for QueryBuilder {
    fn inner_expr_well_known_greater_precedence(
        &self, inner: &SimpleExpr, _outer_oper: &Oper,
    ) -> bool {
        // atomic operands never need parentheses, everything else keeps them
        matches!(
            inner,
            SimpleExpr::Column(_)
                | SimpleExpr::Value(_)
                | SimpleExpr::Constant(_)
                | SimpleExpr::Keyword(_)
                | SimpleExpr::Tuple(_)
                | SimpleExpr::FunctionCall(_)
        )
    }
}

impl sea_query::backend::QueryBuilder for QueryBuilder {
    fn prepare_query_statement(&self, query: &SubQueryStatement, sql: &mut dyn SqlWriter) {
        match query {
            SubQueryStatement::SelectStatement(s) => self.prepare_select_statement(s, sql),
            SubQueryStatement::InsertStatement(s) => self.prepare_insert_statement(s, sql),
            SubQueryStatement::UpdateStatement(s) => self.prepare_update_statement(s, sql),
            SubQueryStatement::DeleteStatement(s) => self.prepare_delete_statement(s, sql),
            SubQueryStatement::WithStatement(s) => self.prepare_with_query(s, sql),
        }
    }

    fn prepare_value(&self, value: &Value, sql: &mut dyn SqlWriter) {
        sql.push_param(value.clone(), self);
    }

    fn placeholder(&self) -> (&str, bool) {
        (self.placeholder, self.numbered)
    }
}

pub(crate) fn table_column(table: &str, column: &str) -> ColumnRef {
    ColumnRef::TableColumn(Alias::new(table).into_iden(), Alias::new(column).into_iden())
}

pub(crate) fn column(column: &str) -> ColumnRef {
    ColumnRef::Column(Alias::new(column).into_iden())
}
