//! Change tracking against the last known database state.

use std::collections::HashMap;

use crate::schema::Schema;
use crate::value::FieldValue;

/// Copies of every persisted field's value, taken when the record was last
/// written to or read from the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: HashMap<&'static str, FieldValue>,
}

impl Snapshot {
    /// Capture the current values of `record`.
    #[must_use]
    pub fn capture<R>(schema: &Schema<R>, record: &R) -> Self {
        let values = schema.columns().iter().map(|meta| (meta.name(), meta.value(record))).collect();
        Self { values }
    }

    /// Whether `field` differs from its captured value.
    ///
    /// Unknown fields are reported as unchanged.
    #[must_use]
    pub fn is_changed<R>(&self, schema: &Schema<R>, record: &R, field: &str) -> bool {
        let Some(meta) = schema.column(field) else {
            return false;
        };
        self.values.get(field).is_none_or(|captured| *captured != meta.value(record))
    }

    /// Names of every changed field, in declaration order.
    #[must_use]
    pub fn changed<R>(&self, schema: &Schema<R>, record: &R) -> Vec<&'static str> {
        schema
            .columns()
            .iter()
            .map(|meta| meta.name())
            .filter(|field| self.is_changed(schema, record, field))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FieldOptions;
    use crate::record::FieldDef;
    use crate::value::{Column, FieldKind};

    #[derive(Default)]
    struct Gauge {
        id: i64,
        ratio: f32,
        label: String,
    }

    fn noop(_: &mut Gauge, _: FieldValue) -> anyhow::Result<()> {
        Ok(())
    }

    fn schema() -> Schema<Gauge> {
        Schema::extract("gauges", vec![
            FieldDef::new("id", FieldKind::I64, FieldOptions::new().primary_key(), |g| {
                g.id.to_value()
            }, noop),
            FieldDef::new("ratio", FieldKind::F32, FieldOptions::new(), |g| g.ratio.to_value(), noop),
            FieldDef::new("label", FieldKind::Str, FieldOptions::new(), |g| g.label.to_value(), noop),
        ])
    }

    #[test]
    fn detects_changes_per_field() {
        let schema = schema();
        let mut gauge = Gauge::default();
        let snapshot = Snapshot::capture(&schema, &gauge);

        assert!(snapshot.changed(&schema, &gauge).is_empty());

        gauge.ratio = 0.25;
        gauge.label = "north".to_string();
        assert!(snapshot.is_changed(&schema, &gauge, "ratio"));
        assert!(!snapshot.is_changed(&schema, &gauge, "id"));
        assert_eq!(snapshot.changed(&schema, &gauge), ["ratio", "label"]);

        let snapshot = Snapshot::capture(&schema, &gauge);
        assert!(snapshot.changed(&schema, &gauge).is_empty());
    }

    #[test]
    fn unknown_field_is_unchanged() {
        let schema = schema();
        let gauge = Gauge::default();
        let snapshot = Snapshot::default();

        assert!(!snapshot.is_changed(&schema, &gauge, "missing"));
        // nothing captured yet
        assert!(snapshot.is_changed(&schema, &gauge, "label"));
    }
}
