//! Table and index definitions.
//!
//! DDL is emitted as plain statements, one per element, with identifiers
//! quoted the same way as in generated DML. Every statement is safe to run
//! repeatedly except [`drop_table`].

use crate::options::IndexSpec;
use crate::schema::{ColumnMeta, Schema};
use crate::value::FieldKind;

/// `CREATE TABLE IF NOT EXISTS` for the record's own table, followed by one
/// `CREATE INDEX IF NOT EXISTS` per indexed field.
///
/// Fields without `raw` or `type` get [`FieldKind::sql_type`].
#[must_use]
pub fn create_table<R>(schema: &Schema<R>) -> Vec<String> {
    create_table_with(schema, FieldKind::sql_type)
}

/// Same as [`create_table`], with `column_type` naming the type of fields
/// that declare neither `raw` nor `type`.
#[must_use]
pub fn create_table_with<R>(
    schema: &Schema<R>, column_type: impl Fn(FieldKind) -> &'static str,
) -> Vec<String> {
    let table = schema.table();
    let mut columns = Vec::new();
    let mut indexes = Vec::new();

    for meta in schema.own_columns() {
        columns.push(column_definition(schema, meta, &column_type));

        if let Some(index) = &meta.field().options.index {
            let name = match index {
                IndexSpec::Auto => format!("{table}_{}_idx", meta.column()),
                IndexSpec::Named(name) => name.clone(),
            };
            indexes.push(format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote(&name),
                quote(table),
                quote(meta.column())
            ));
        }
    }

    let mut statements = Vec::with_capacity(indexes.len() + 1);
    statements.push(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quote(table),
        columns.join(",\n    ")
    ));
    statements.extend(indexes);

    for sql in &statements {
        tracing::debug!(table, sql = %sql, "generated DDL");
    }
    statements
}

/// `DROP TABLE` for the record's own table.
#[must_use]
pub fn drop_table<R>(schema: &Schema<R>) -> String {
    format!("DROP TABLE {}", quote(schema.table()))
}

// A raw definition is taken as complete: no type or constraints are added.
fn column_definition<R>(
    schema: &Schema<R>, meta: &ColumnMeta<R>, column_type: &dyn Fn(FieldKind) -> &'static str,
) -> String {
    let column = quote(meta.column());
    let options = &meta.field().options;
    if let Some(raw) = &options.raw {
        return format!("{column} {raw}");
    }

    let sql_type = if options.auto_increment {
        "SERIAL"
    } else {
        options.sql_type.as_deref().unwrap_or_else(|| column_type(meta.field().kind))
    };

    let mut def = format!("{column} {sql_type}");
    if schema.is_primary_key(meta) {
        def.push_str(" PRIMARY KEY");
    }
    if options.unique {
        def.push_str(" UNIQUE");
    }
    if options.not_null {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &options.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
