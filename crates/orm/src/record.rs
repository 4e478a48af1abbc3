use std::fmt;

use anyhow::Result;

use crate::join::Join;
use crate::options::FieldOptions;
use crate::value::{FieldKind, FieldValue};

/// Reads a field's value from a record.
pub type Getter<R> = fn(&R) -> FieldValue;

/// Writes a value of the field's kind into a record.
pub type Setter<R> = fn(&mut R, FieldValue) -> Result<()>;

/// Describes one field of a record: its name, kind, mapping options and how
/// to read and write it.
pub struct FieldDef<R> {
    /// Field identifier as declared on the record.
    pub name: &'static str,
    /// Scalar kind of the field.
    pub kind: FieldKind,
    /// Mapping options.
    pub options: FieldOptions,
    /// Accessor.
    pub get: Getter<R>,
    /// Mutator.
    pub set: Setter<R>,
}

impl<R> FieldDef<R> {
    /// Describe a field.
    #[must_use]
    pub const fn new(
        name: &'static str, kind: FieldKind, options: FieldOptions, get: Getter<R>,
        set: Setter<R>,
    ) -> Self {
        Self {
            name,
            kind,
            options,
            get,
            set,
        }
    }
}

impl<R> Clone for FieldDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            options: self.options.clone(),
            get: self.get,
            set: self.set,
        }
    }
}

impl<R> fmt::Debug for FieldDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A struct that can be bound to a table.
///
/// Typically implemented via the `record!` macro rather than manually.
pub trait Record: Sized {
    /// The table the record is stored in.
    const TABLE: &'static str;

    /// Field descriptors, in declaration order.
    fn fields() -> Vec<FieldDef<Self>>;

    /// Joins added to every SELECT for this record.
    #[must_use]
    fn joins() -> Vec<Join> {
        Vec::new()
    }
}

/// Declares a record struct with an automatic `Record` implementation.
///
/// Each field may be followed by `=> "options"`, the field's option string
/// (see [`FieldOptions::from_tag`]). `=> "-"` excludes the field from the
/// table.
///
/// # Examples
///
/// ```ignore
/// record! {
///     table = "users",
///     #[derive(Debug, Default)]
///     pub struct User {
///         pub id: i64 => "primary_key; auto_increment",
///         pub name: String => "not null",
///         pub last_touch: i64 => "index",
///         pub scratch: String => "-",
///     }
/// }
/// ```
///
/// Columns from other tables are mapped with the `table` option and brought
/// in with default joins:
///
/// ```ignore
/// record! {
///     table = "employees",
///     joins = [Join::left("departments", "employees.department_id = departments.id")],
///     pub struct EmployeeRow {
///         pub id: i64 => "primary_key",
///         pub department: String => "table: departments; column: name",
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (@options) => { "" };
    (@options $options:literal) => { $options };

    // Full form: joins + struct
    (
        table = $table:literal,
        joins = [$($join:expr),* $(,)?],
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_type:ty $(=> $options:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field : $field_type
            ),*
        }

        impl $crate::Record for $name {
            const TABLE: &'static str = $table;

            fn fields() -> ::std::vec::Vec<$crate::FieldDef<Self>> {
                vec![
                    $(
                        $crate::FieldDef::new(
                            stringify!($field),
                            <$field_type as $crate::Column>::KIND,
                            $crate::FieldOptions::from_tag($crate::record!(@options $($options)?)),
                            |record: &Self| $crate::Column::to_value(&record.$field),
                            |record: &mut Self, value: $crate::FieldValue| -> $crate::__private::Result<()> {
                                record.$field = <$field_type as $crate::Column>::from_value(value)?;
                                Ok(())
                            },
                        ),
                    )*
                ]
            }

            fn joins() -> ::std::vec::Vec<$crate::Join> {
                vec![$($join),*]
            }
        }
    };

    // Bare table → forward with no joins
    (
        table = $table:literal,
        $($rest:tt)*
    ) => {
        $crate::record! {
            table = $table,
            joins = [],
            $($rest)*
        }
    };
}
