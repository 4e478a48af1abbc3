use std::fmt;

use anyhow::{Result, bail};
use sea_query::{Value, Values};

use crate::error::Error;

/// The scalar kinds a record field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `bool`.
    Bool,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// `String`.
    Str,
}

impl FieldKind {
    /// Column type used when a field declares neither `raw` nor `type`.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => "INT",
            // no unsigned column types
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => "INT",
            Self::F32 | Self::F64 => "FLOAT",
            Self::Str => "STRING",
        }
    }

    /// Whether a database generated identifier can be written to this kind.
    #[must_use]
    pub const fn accepts_identifier(self) -> bool {
        !matches!(self, Self::Bool | Self::F32 | Self::F64)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
        };
        f.write_str(name)
    }
}

/// A field's value, tagged with its kind.
///
/// Equality is kind-specific: values of different kinds are never equal.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A `bool`.
    Bool(bool),
    /// An `i8`.
    I8(i8),
    /// An `i16`.
    I16(i16),
    /// An `i32`.
    I32(i32),
    /// An `i64`.
    I64(i64),
    /// A `u8`.
    U8(u8),
    /// A `u16`.
    U16(u16),
    /// A `u32`.
    U32(u32),
    /// A `u64`.
    U64(u64),
    /// An `f32`.
    F32(f32),
    /// An `f64`.
    F64(f64),
    /// A `String`.
    Str(String),
}

impl FieldValue {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::I8(_) => FieldKind::I8,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::I64(_) => FieldKind::I64,
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::U64(_) => FieldKind::U64,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
            Self::Str(_) => FieldKind::Str,
        }
    }

    /// Whether this is the zero value of its kind.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::I8(v) => *v == 0,
            Self::I16(v) => *v == 0,
            Self::I32(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::U8(v) => *v == 0,
            Self::U16(v) => *v == 0,
            Self::U32(v) => *v == 0,
            Self::U64(v) => *v == 0,
            Self::F32(v) => *v == 0.0,
            Self::F64(v) => *v == 0.0,
            Self::Str(v) => v.is_empty(),
        }
    }

    /// Convert a value read from the database into a value of `kind`.
    ///
    /// Integers are range checked, integers are accepted for booleans and
    /// floats, and binary data is accepted for strings when it is UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NULL, of an incompatible type, or out
    /// of range for `kind`.
    pub fn from_data(kind: FieldKind, data: &DataType) -> Result<Self> {
        if data.is_null() {
            return Err(Error::UnexpectedNull { kind }.into());
        }

        let value = match kind {
            FieldKind::Bool => match data {
                DataType::Boolean(Some(v)) => Self::Bool(*v),
                _ => Self::Bool(integer(kind, data)? != 0),
            },
            FieldKind::I8 => Self::I8(narrow(kind, data)?),
            FieldKind::I16 => Self::I16(narrow(kind, data)?),
            FieldKind::I32 => Self::I32(narrow(kind, data)?),
            FieldKind::I64 => Self::I64(narrow(kind, data)?),
            FieldKind::U8 => Self::U8(narrow(kind, data)?),
            FieldKind::U16 => Self::U16(narrow(kind, data)?),
            FieldKind::U32 => Self::U32(narrow(kind, data)?),
            FieldKind::U64 => Self::U64(narrow(kind, data)?),
            #[allow(clippy::cast_possible_truncation)]
            FieldKind::F32 => Self::F32(float(kind, data)? as f32),
            FieldKind::F64 => Self::F64(float(kind, data)?),
            FieldKind::Str => match data {
                DataType::Str(Some(v)) => Self::Str(v.clone()),
                DataType::Binary(Some(bytes)) => match String::from_utf8(bytes.clone()) {
                    Ok(v) => Self::Str(v),
                    Err(_) => return Err(mismatch(kind, data)),
                },
                _ => return Err(mismatch(kind, data)),
            },
        };
        Ok(value)
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Bool(v) => v.into(),
            FieldValue::I8(v) => v.into(),
            FieldValue::I16(v) => v.into(),
            FieldValue::I32(v) => v.into(),
            FieldValue::I64(v) => v.into(),
            FieldValue::U8(v) => v.into(),
            FieldValue::U16(v) => v.into(),
            FieldValue::U32(v) => v.into(),
            FieldValue::U64(v) => v.into(),
            FieldValue::F32(v) => v.into(),
            FieldValue::F64(v) => v.into(),
            FieldValue::Str(v) => v.into(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Rust types that can back a record field.
pub trait Column: Sized {
    /// The field kind this type maps to.
    const KIND: FieldKind;

    /// Copy the current value out.
    fn to_value(&self) -> FieldValue;

    /// Take a value of [`Self::KIND`] back.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is of a different kind.
    fn from_value(value: FieldValue) -> Result<Self>;
}

macro_rules! column {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Column for $ty {
                const KIND: FieldKind = FieldKind::$variant;

                fn to_value(&self) -> FieldValue {
                    FieldValue::$variant(self.clone())
                }

                fn from_value(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::$variant(v) => Ok(v),
                        other => Err(Error::TypeMismatch {
                            expected: FieldKind::$variant,
                            found: other.kind().to_string(),
                        }
                        .into()),
                    }
                }
            }

            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

column! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
}

/// Values exchanged with a [`Connection`](crate::Connection), as statement
/// parameters and as result columns. `None` is SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// A boolean.
    Boolean(Option<bool>),
    /// A 32-bit signed integer.
    Int32(Option<i32>),
    /// A 64-bit signed integer.
    Int64(Option<i64>),
    /// A 32-bit unsigned integer.
    Uint32(Option<u32>),
    /// A 64-bit unsigned integer.
    Uint64(Option<u64>),
    /// A 32-bit float.
    Float(Option<f32>),
    /// A 64-bit float.
    Double(Option<f64>),
    /// UTF-8 text.
    Str(Option<String>),
    /// Raw bytes.
    Binary(Option<Vec<u8>>),
}

impl DataType {
    /// Whether this is a SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Boolean(None)
                | Self::Int32(None)
                | Self::Int64(None)
                | Self::Uint32(None)
                | Self::Uint64(None)
                | Self::Float(None)
                | Self::Double(None)
                | Self::Str(None)
                | Self::Binary(None)
        )
    }
}

impl From<FieldValue> for DataType {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Bool(v) => Self::Boolean(Some(v)),
            FieldValue::I8(v) => Self::Int32(Some(i32::from(v))),
            FieldValue::I16(v) => Self::Int32(Some(i32::from(v))),
            FieldValue::I32(v) => Self::Int32(Some(v)),
            FieldValue::I64(v) => Self::Int64(Some(v)),
            FieldValue::U8(v) => Self::Uint32(Some(u32::from(v))),
            FieldValue::U16(v) => Self::Uint32(Some(u32::from(v))),
            FieldValue::U32(v) => Self::Uint32(Some(v)),
            FieldValue::U64(v) => Self::Uint64(Some(v)),
            FieldValue::F32(v) => Self::Float(Some(v)),
            FieldValue::F64(v) => Self::Double(Some(v)),
            FieldValue::Str(v) => Self::Str(Some(v)),
        }
    }
}

// Outbound conversion of statement parameters
pub(crate) fn values_to_datatypes(values: Values) -> Result<Vec<DataType>> {
    values.into_iter().map(value_to_datatype).collect()
}

fn value_to_datatype(value: Value) -> Result<DataType> {
    let data_type = match value {
        Value::Bool(v) => DataType::Boolean(v),
        Value::TinyInt(v) => DataType::Int32(v.map(i32::from)),
        Value::SmallInt(v) => DataType::Int32(v.map(i32::from)),
        Value::Int(v) => DataType::Int32(v),
        Value::BigInt(v) => DataType::Int64(v),
        Value::TinyUnsigned(v) => DataType::Uint32(v.map(u32::from)),
        Value::SmallUnsigned(v) => DataType::Uint32(v.map(u32::from)),
        Value::Unsigned(v) => DataType::Uint32(v),
        Value::BigUnsigned(v) => DataType::Uint64(v),
        Value::Float(v) => DataType::Float(v),
        Value::Double(v) => DataType::Double(v),
        Value::String(v) => DataType::Str(v.map(|value| *value)),
        Value::Char(v) => DataType::Str(v.map(|ch| ch.to_string())),
        Value::Bytes(v) => DataType::Binary(v.map(|bytes| *bytes)),
        _ => bail!("unsupported parameter value"),
    };
    Ok(data_type)
}

// Inbound conversion helpers
fn integer(kind: FieldKind, data: &DataType) -> Result<i128> {
    match data {
        DataType::Int32(Some(v)) => Ok(i128::from(*v)),
        DataType::Int64(Some(v)) => Ok(i128::from(*v)),
        DataType::Uint32(Some(v)) => Ok(i128::from(*v)),
        DataType::Uint64(Some(v)) => Ok(i128::from(*v)),
        _ => Err(mismatch(kind, data)),
    }
}

fn narrow<T: TryFrom<i128>>(kind: FieldKind, data: &DataType) -> Result<T> {
    let value = integer(kind, data)?;
    T::try_from(value).map_err(|_e| Error::OutOfRange { kind, value: value.to_string() }.into())
}

#[allow(clippy::cast_precision_loss)]
fn float(kind: FieldKind, data: &DataType) -> Result<f64> {
    match data {
        DataType::Float(Some(v)) => Ok(f64::from(*v)),
        DataType::Double(Some(v)) => Ok(*v),
        _ => integer(kind, data).map(|v| v as f64),
    }
}

fn mismatch(expected: FieldKind, data: &DataType) -> anyhow::Error {
    Error::TypeMismatch {
        expected,
        found: format!("{data:?}"),
    }
    .into()
}
