use anyhow::Result;

use crate::error::Error;
use crate::schema::{ColumnMeta, Schema};
use crate::value::{DataType, FieldValue};

/// Write targets for the columns of a result set, in result column order.
pub struct Targets<'a, R> {
    fields: Vec<&'a ColumnMeta<R>>,
}

impl<'a, R> Targets<'a, R> {
    /// Route each result column to a field through its `"table.column"`
    /// selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedColumn`] if a column does not belong to any
    /// persisted field.
    pub fn resolve(schema: &'a Schema<R>, columns: &[String]) -> Result<Self> {
        let fields = columns
            .iter()
            .map(|column| {
                schema.by_selector(column).ok_or_else(|| {
                    anyhow::Error::from(Error::UnmappedColumn {
                        column: column.clone(),
                    })
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self { fields })
    }

    /// Write one row into `record`.
    ///
    /// Every value is converted before any field is written, so a failed
    /// conversion leaves `record` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowWidth`] if the row does not match the columns, or
    /// the conversion error of the first value that does not fit its field.
    pub fn apply(&self, record: &mut R, row: &[DataType]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(Error::RowWidth {
                expected: self.fields.len(),
                actual: row.len(),
            }
            .into());
        }

        let values = self
            .fields
            .iter()
            .zip(row)
            .map(|(meta, data)| FieldValue::from_data(meta.field().kind, data))
            .collect::<Result<Vec<_>>>()?;

        for (meta, value) in self.fields.iter().zip(values) {
            (meta.field().set)(record, value)?;
        }
        Ok(())
    }
}
