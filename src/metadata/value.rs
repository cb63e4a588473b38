use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

/// A single metadata cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// `true` / `false`
    Boolean(bool),
    /// Anything else
    Text(String),
}

impl Value {
    /// Text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counts
    pub(crate) fn distinct_key(&self) -> DistinctKey<'_> {
        match self {
            Value::Integer(i) => DistinctKey::Integer(*i),
            Value::Float(f) => DistinctKey::Float(f.to_bits()),
            Value::Boolean(b) => DistinctKey::Boolean(*b),
            Value::Text(s) => DistinctKey::Text(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DistinctKey<'a> {
    Integer(i64),
    Float(u64),
    Boolean(bool),
    Text(&'a str),
}

/// Inferred type of a metadata column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every value is an integer
    Integer,
    /// Every value is numeric, at least one is fractional
    Float,
    /// Every value is a boolean
    Boolean,
    /// Mixed or free text
    Text,
    /// No values at all
    Empty,
}

impl ColumnKind {
    /// Narrowest kind that holds every non-null value
    pub fn of<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a Value>>,
    {
        let mut kind = ColumnKind::Empty;
        for value in values.into_iter().flatten() {
            kind = match (kind, value) {
                (ColumnKind::Empty, Value::Integer(_)) => ColumnKind::Integer,
                (ColumnKind::Empty, Value::Float(_)) => ColumnKind::Float,
                (ColumnKind::Empty, Value::Boolean(_)) => ColumnKind::Boolean,
                (ColumnKind::Integer, Value::Integer(_)) => ColumnKind::Integer,
                (ColumnKind::Integer | ColumnKind::Float, Value::Integer(_) | Value::Float(_)) => {
                    ColumnKind::Float
                }
                (ColumnKind::Boolean, Value::Boolean(_)) => ColumnKind::Boolean,
                _ => return ColumnKind::Text,
            };
        }
        kind
    }

    /// Arrow type used when exporting a column of this kind
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Text | ColumnKind::Empty => DataType::Utf8,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// Parse one delimited-text cell as `kind`. Returns `None` if it does not fit.
pub(crate) fn parse_cell(raw: &str, kind: ColumnKind) -> Option<Value> {
    match kind {
        ColumnKind::Integer => raw.parse().ok().map(Value::Integer),
        ColumnKind::Float => raw.parse().ok().map(Value::Float),
        ColumnKind::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Boolean(false))
            } else {
                None
            }
        }
        ColumnKind::Text | ColumnKind::Empty => Some(Value::Text(raw.to_string())),
    }
}

/// Build an Arrow array for one column of values
pub(crate) fn column_array<'a, I>(kind: ColumnKind, values: I) -> ArrayRef
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    match kind {
        ColumnKind::Integer => {
            let mut builder = Int64Builder::new();
            for value in values {
                match value {
                    Some(Value::Integer(i)) => builder.append_value(*i),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Float => {
            let mut builder = Float64Builder::new();
            for value in values {
                builder.append_option(value.and_then(Value::as_f64));
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Boolean => {
            let mut builder = BooleanBuilder::new();
            for value in values {
                match value {
                    Some(Value::Boolean(b)) => builder.append_value(*b),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Text | ColumnKind::Empty => {
            let mut builder = StringBuilder::new();
            for value in values {
                builder.append_option(value.map(ToString::to_string));
            }
            Arc::new(builder.finish())
        }
    }
}
