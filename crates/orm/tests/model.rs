//! Record binding tests against an in-memory recording connection.

#![allow(missing_docs)]

mod common;

use std::ops::ControlFlow;

use common::{Employee, Recorder, Token, User, assert_sql_contains, init_tracing, text};
use tabula_orm::{DataType, Error, Model, SelectBuilder};

const USER_COLUMNS: [&str; 3] = ["users.id", "users.name", "users.last_touch"];

fn user_row(id: i64, name: &str, last_touch: i64) -> Vec<DataType> {
    vec![DataType::Int64(Some(id)), text(name), DataType::Int64(Some(last_touch))]
}

#[test]
fn save_inserts_then_updates() {
    init_tracing();
    let conn = Recorder::new();
    conn.respond(&["id"], vec![vec![DataType::Int64(Some(42))]]);

    let mut user = Model::new(User {
        name: "a".to_string(),
        ..User::default()
    });
    user.save(&conn).unwrap();

    assert_eq!(user.id, 42);
    assert!(user.is_persisted());
    assert!(user.changed_fields().is_empty());

    let insert = conn.last();
    assert_sql_contains(&insert.sql, &["INSERT INTO users (name, last_touch)", "RETURNING id"]);
    assert!(!insert.sql.contains("(id"));
    assert_eq!(insert.params, vec![text("a"), DataType::Int64(Some(0))]);

    user.name = "b".to_string();
    assert!(user.is_changed("name"));
    user.save(&conn).unwrap();

    let update = conn.last();
    assert_sql_contains(&update.sql, &["UPDATE users SET name = $1 WHERE id = $2"]);
    assert_eq!(update.params, vec![text("b"), DataType::Int64(Some(42))]);
    assert_eq!(conn.calls().len(), 2);
}

#[test]
fn save_without_changes_issues_nothing() {
    let conn = Recorder::new();
    let mut user = Model::new(User {
        id: 5,
        name: "a".to_string(),
        ..User::default()
    });

    user.save(&conn).unwrap();
    user.scratch = "not persisted".to_string();
    user.save(&conn).unwrap();

    assert!(conn.calls().is_empty());
}

#[test]
fn set_primary_key_means_update() {
    let conn = Recorder::new();
    let mut user = Model::new(User::default());
    assert!(!user.is_set("id"));

    user.id = 3;
    user.name = "c".to_string();
    assert!(user.is_set("id"));
    user.save(&conn).unwrap();

    let update = conn.last();
    assert_sql_contains(&update.sql, &["UPDATE users SET id = $1, name = $2 WHERE id = $3"]);
    assert_eq!(update.params.last(), Some(&DataType::Int64(Some(3))));
}

#[test]
fn insert_with_string_key() {
    let conn = Recorder::new();
    conn.respond(&["code"], vec![vec![text("tok-1")]]);

    let mut token = Model::new(Token {
        uses: 2,
        ..Token::default()
    });
    token.save(&conn).unwrap();

    assert_eq!(token.code, "tok-1");
    assert_sql_contains(&conn.last().sql, &["INSERT INTO tokens (uses) VALUES ($1) RETURNING code"]);
    assert_eq!(conn.last().params, vec![DataType::Uint32(Some(2))]);
}

#[test]
fn insert_without_returned_row() {
    let conn = Recorder::new();
    let mut user = Model::new(User::default());

    let err = user.save(&conn).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::MissingIdentifier {
        table: "users".to_string()
    }));
    assert!(!user.is_persisted());
}

#[test]
fn fetch_loads_first_row() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![user_row(8, "ada", 100), user_row(9, "bob", 200)]);

    let mut user = Model::new(User::default());
    let select = SelectBuilder::new().r#where("users.id = $1").bind(8_i64);
    assert!(user.fetch(&conn, &select).unwrap());

    assert_eq!(user.id, 8);
    assert_eq!(user.name, "ada");
    assert_eq!(user.last_touch, 100);
    assert!(user.is_persisted());
    assert!(user.changed_fields().is_empty());

    let query = conn.last();
    assert_sql_contains(&query.sql, &["FROM users", "WHERE users.id = $1"]);
    assert_eq!(query.params, vec![DataType::Int64(Some(8))]);
}

#[test]
fn fetch_without_rows() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![]);

    let mut user = Model::new(User {
        name: "kept".to_string(),
        ..User::default()
    });
    assert!(!user.fetch(&conn, &SelectBuilder::new()).unwrap());
    assert_eq!(user.name, "kept");
    assert!(!user.is_persisted());
}

#[test]
fn fetch_joined_columns() {
    let conn = Recorder::new();
    conn.respond(&["departments.name", "employees.id", "employees.department_id"], vec![vec![
        text("ops"),
        DataType::Int64(Some(1)),
        DataType::Int64(Some(4)),
    ]]);

    let mut employee = Model::new(Employee::default());
    employee.fetch(&conn, &SelectBuilder::new()).unwrap();

    assert_eq!(*employee, Employee {
        id: 1,
        department_id: 4,
        department: "ops".to_string(),
    });
}

#[test]
fn fetch_rejects_null() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![vec![
        DataType::Int64(Some(1)),
        DataType::Str(None),
        DataType::Int64(Some(0)),
    ]]);

    let mut user = Model::new(User::default());
    let err = user.fetch(&conn, &SelectBuilder::new()).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnexpectedNull { .. })));
}

#[test]
fn failed_fetch_keeps_record() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![vec![DataType::Int64(Some(1)), text("a"), DataType::Int64(None)]]);

    let mut user = Model::new(User {
        name: "keep".to_string(),
        ..User::default()
    });
    let err = user.fetch(&conn, &SelectBuilder::new()).unwrap_err();

    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnexpectedNull { .. })));
    assert_eq!(*user, User {
        name: "keep".to_string(),
        ..User::default()
    });
    assert!(user.changed_fields().is_empty());
    assert!(!user.is_persisted());
}

#[test]
fn each_visits_rows_in_order() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![user_row(1, "a", 0), user_row(2, "b", 0), user_row(3, "c", 0)]);

    let mut user = Model::new(User::default());
    let mut seen = Vec::new();
    user.each(&conn, &SelectBuilder::new().order_by("id"), |row| {
        seen.push(row.unwrap().name.clone());
        ControlFlow::Continue(())
    });

    assert_eq!(seen, ["a", "b", "c"]);
    // the binding holds the last row
    assert_eq!(user.id, 3);
}

#[test]
fn each_stops_on_break() {
    let conn = Recorder::new();
    conn.respond(&USER_COLUMNS, vec![user_row(1, "a", 0), user_row(2, "b", 0)]);

    let mut user = Model::new(User::default());
    let mut visits = 0;
    user.each(&conn, &SelectBuilder::new(), |row| {
        row.expect("row");
        visits += 1;
        ControlFlow::Break(())
    });

    assert_eq!(visits, 1);
    assert_eq!(user.id, 1);
}

#[test]
fn each_reports_mapping_errors() {
    let conn = Recorder::new();
    conn.respond(&["users.id", "mystery"], vec![vec![DataType::Int64(Some(1)), text("?")]]);

    let mut user = Model::new(User::default());
    let mut errors = Vec::new();
    user.each(&conn, &SelectBuilder::new(), |row| {
        if let Err(err) = row {
            errors.push(err.to_string());
        }
        ControlFlow::Continue(())
    });

    assert_eq!(errors, ["result column `mystery` does not map to a field"]);
    assert_eq!(user.id, 0);
}

#[test]
fn delete_by_key() {
    let conn = Recorder::new();
    let mut user = Model::new(User {
        id: 11,
        ..User::default()
    });
    user.delete(&conn).unwrap();

    let call = conn.last();
    assert_sql_contains(&call.sql, &["DELETE FROM users WHERE id = $1"]);
    assert_eq!(call.params, vec![DataType::Int64(Some(11))]);
    assert!(!user.is_persisted());
}

#[test]
fn create_and_drop_table() {
    let conn = Recorder::new();
    let user = Model::new(User::default());

    user.create_table(&conn).unwrap();
    user.auto_migrate(&conn).unwrap();
    user.drop_table(&conn).unwrap();

    let calls = conn.calls();
    assert_eq!(calls.len(), 5);
    assert!(calls[0].sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "users""#));
    assert!(calls[1].sql.starts_with(r#"CREATE INDEX IF NOT EXISTS "users_last_touch_idx""#));
    assert_eq!(calls[2], calls[0]);
    assert_eq!(calls[4].sql, r#"DROP TABLE "users""#);
    assert!(calls.iter().all(|call| call.params.is_empty()));
}

#[test]
fn into_inner_releases_record() {
    let user = Model::new(User {
        id: 1,
        name: "a".to_string(),
        ..User::default()
    });
    assert_eq!(user.schema().table(), "users");
    assert_eq!(user.into_inner().name, "a");
}
