use std::ops::{ControlFlow, Deref, DerefMut};

use anyhow::Result;

use crate::connection::Connection;
use crate::ddl;
use crate::delete::DeleteBuilder;
use crate::error::Error;
use crate::insert::InsertBuilder;
use crate::materialize::Targets;
use crate::query::Query;
use crate::record::Record;
use crate::schema::Schema;
use crate::select::SelectBuilder;
use crate::tracker::Snapshot;
use crate::update::UpdateBuilder;

/// A record bound to its table.
///
/// The binding owns the record together with its schema and the snapshot of
/// the values last written to or read from the database. The record itself is
/// reached through `Deref`/`DerefMut`.
///
/// ```ignore
/// let mut user = Model::new(User { name: "a".to_string(), ..User::default() });
/// user.save(&conn)?; // INSERT, `id` is filled in
///
/// user.name = "b".to_string();
/// user.save(&conn)?; // UPDATE users SET name = $1 WHERE id = $2
/// ```
pub struct Model<R> {
    record: R,
    schema: Schema<R>,
    snapshot: Snapshot,
    persisted: bool,
}

impl<R: Record> Model<R> {
    /// Bind `record` to its table.
    ///
    /// The record's current values form the initial snapshot.
    #[must_use]
    pub fn new(record: R) -> Self {
        let schema = Schema::of();
        let snapshot = Snapshot::capture(&schema, &record);
        Self {
            record,
            schema,
            snapshot,
            persisted: false,
        }
    }

    /// Release the record.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.record
    }

    /// The record's table metadata.
    #[must_use]
    pub const fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    /// Whether `field` differs from the last saved or fetched value.
    #[must_use]
    pub fn is_changed(&self, field: &str) -> bool {
        self.snapshot.is_changed(&self.schema, &self.record, field)
    }

    /// Every field that differs from the last saved or fetched value.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.snapshot.changed(&self.schema, &self.record)
    }

    /// Whether `field` holds a non-zero value.
    #[must_use]
    pub fn is_set(&self, field: &str) -> bool {
        self.schema.column(field).is_some_and(|meta| meta.is_set(&self.record))
    }

    /// Whether the record was inserted or fetched through this binding.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Insert or update the record.
    ///
    /// A record that is persisted, or whose primary key is set, is updated;
    /// otherwise it is inserted and its primary key populated with the
    /// generated identifier. Either way the snapshot is refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no usable primary key or the
    /// connection fails.
    pub fn save<C: Connection>(&mut self, conn: &C) -> Result<()> {
        let pk = self.schema.require_primary_key()?;
        if self.persisted || pk.is_set(&self.record) {
            self.update(conn)?;
        } else {
            self.insert(conn)?;
        }

        self.snapshot = Snapshot::capture(&self.schema, &self.record);
        self.persisted = true;
        Ok(())
    }

    fn insert<C: Connection>(&mut self, conn: &C) -> Result<()> {
        let query = InsertBuilder::new(&self.schema, &self.record).build()?;
        let mut rows = conn.query(&query.sql, &query.params)?;

        let missing = || Error::MissingIdentifier {
            table: self.schema.table().to_string(),
        };
        let row = rows.next_row()?.ok_or_else(missing)?;
        let id = row.first().ok_or_else(missing)?;

        let pk = self.schema.require_primary_key()?;
        pk.assign(&mut self.record, id)?;

        tracing::debug!(table = self.schema.table(), id = ?pk.value(&self.record), "inserted record");
        Ok(())
    }

    fn update<C: Connection>(&self, conn: &C) -> Result<()> {
        if let Some(query) = UpdateBuilder::new(&self.schema, &self.record, &self.snapshot).build()? {
            execute(conn, &query)?;
        }
        Ok(())
    }

    /// Delete the record's row, keyed by primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no primary key or the connection
    /// fails.
    pub fn delete<C: Connection>(&mut self, conn: &C) -> Result<()> {
        let query = DeleteBuilder::new(&self.schema, &self.record).build()?;
        execute(conn, &query)?;
        self.persisted = false;
        Ok(())
    }

    /// Load the first row matching `select` into the record.
    ///
    /// Returns `false`, leaving the record untouched, when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or a result column cannot be
    /// written to its field.
    pub fn fetch<C: Connection>(&mut self, conn: &C, select: &SelectBuilder) -> Result<bool> {
        let query = select.build(&self.schema)?;
        let mut rows = conn.query(&query.sql, &query.params)?;
        let targets = Targets::resolve(&self.schema, rows.columns())?;

        let Some(row) = rows.next_row()? else {
            return Ok(false);
        };
        targets.apply(&mut self.record, &row)?;

        self.snapshot = Snapshot::capture(&self.schema, &self.record);
        self.persisted = true;
        Ok(true)
    }

    /// Load each row matching `select` into the record in turn.
    ///
    /// The callback sees the record after every row and stops iteration by
    /// returning [`ControlFlow::Break`]. Failures are handed to the callback
    /// as `Err` and end the iteration.
    pub fn each<C, F>(&mut self, conn: &C, select: &SelectBuilder, mut f: F)
    where
        C: Connection,
        F: FnMut(Result<&R>) -> ControlFlow<()>,
    {
        let rows = select.build(&self.schema).and_then(|query| conn.query(&query.sql, &query.params));
        let mut rows = match rows {
            Ok(rows) => rows,
            Err(err) => {
                let _ = f(Err(err));
                return;
            }
        };
        let targets = match Targets::resolve(&self.schema, rows.columns()) {
            Ok(targets) => targets,
            Err(err) => {
                let _ = f(Err(err));
                return;
            }
        };

        loop {
            let row = match rows.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => return,
                Err(err) => {
                    let _ = f(Err(err));
                    return;
                }
            };
            if let Err(err) = targets.apply(&mut self.record, &row) {
                let _ = f(Err(err));
                return;
            }

            self.snapshot = Snapshot::capture(&self.schema, &self.record);
            self.persisted = true;

            if f(Ok(&self.record)).is_break() {
                return;
            }
        }
    }

    /// Create the record's table and indexes if they do not exist.
    ///
    /// Default column types come from [`Connection::column_type`].
    ///
    /// # Errors
    ///
    /// Returns the connection's error.
    pub fn create_table<C: Connection>(&self, conn: &C) -> Result<()> {
        for sql in ddl::create_table_with(&self.schema, |kind| conn.column_type(kind)) {
            let statement = conn.prepare(&sql)?;
            conn.execute(&statement, &[])?;
        }
        Ok(())
    }

    /// Same as [`create_table`](Self::create_table).
    ///
    /// # Errors
    ///
    /// Returns the connection's error.
    pub fn auto_migrate<C: Connection>(&self, conn: &C) -> Result<()> {
        self.create_table(conn)
    }

    /// Drop the record's table.
    ///
    /// # Errors
    ///
    /// Returns the connection's error, including when the table does not
    /// exist.
    pub fn drop_table<C: Connection>(&self, conn: &C) -> Result<()> {
        let statement = conn.prepare(&ddl::drop_table(&self.schema))?;
        conn.execute(&statement, &[])?;
        Ok(())
    }
}

impl<R> Deref for Model<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}

impl<R> DerefMut for Model<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.record
    }
}

fn execute<C: Connection>(conn: &C, query: &Query) -> Result<u64> {
    let statement = conn.prepare(&query.sql)?;
    conn.execute(&statement, &query.params)
}
