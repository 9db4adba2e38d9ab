use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or bound as query parameters.
///
/// The same enum is used by every backend so the query functions never branch
/// on driver types:
/// ```rust
/// use childes_db::prelude::*;
///
/// let params = vec![
///     RowValues::Text("Brown".into()),
///     RowValues::Float(24.0),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    ///
    /// Age columns come back as DECIMAL/DOUBLE from MySQL but may be stored as
    /// INTEGER in a SQLite mirror, so callers comparing ages go through here.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Render the value as a plain CSV cell. NULL becomes the empty string.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Text(s) => s.clone(),
            RowValues::Bool(b) => b.to_string(),
            RowValues::Timestamp(dt) => dt.format("%F %T%.f").to_string(),
            RowValues::Null => String::new(),
            RowValues::JSON(value) => value.to_string(),
            RowValues::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl Serialize for RowValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValues::Int(i) => serializer.serialize_i64(*i),
            RowValues::Float(f) => serializer.serialize_f64(*f),
            RowValues::Text(s) => serializer.serialize_str(s),
            RowValues::Bool(b) => serializer.serialize_bool(*b),
            RowValues::Timestamp(dt) => {
                serializer.serialize_str(&dt.format("%F %T%.f").to_string())
            }
            RowValues::Null => serializer.serialize_none(),
            RowValues::JSON(value) => value.serialize(serializer),
            RowValues::Blob(bytes) => serializer.collect_seq(bytes.iter()),
        }
    }
}

/// The backends a `ChildesConnection` can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// The hosted CHILDES server, or a local MySQL install of a dump
    #[cfg(feature = "mysql")]
    MySql,
    /// A local `SQLite` mirror of the CHILDES tables
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// A query and its parameters bundled together.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL text, using `?` placeholders
    pub query: String,
    /// The parameters to bind, in placeholder order
    pub params: Vec<RowValues>,
}

impl QueryAndParams {
    pub fn new(query: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_float_widens_integers() {
        assert_eq!(RowValues::Int(30).as_float(), Some(30.0));
        assert_eq!(RowValues::Float(30.5).as_float(), Some(30.5));
        assert_eq!(RowValues::Text("30".into()).as_float(), None);
    }

    #[test]
    fn serializes_null_as_json_null() {
        let out = serde_json::to_string(&vec![
            RowValues::Null,
            RowValues::Int(2),
            RowValues::Text("doggy".into()),
        ])
        .unwrap();
        assert_eq!(out, r#"[null,2,"doggy"]"#);
    }

    #[test]
    fn csv_cells() {
        assert_eq!(RowValues::Null.to_cell(), "");
        assert_eq!(RowValues::Bool(true).to_cell(), "true");
        assert_eq!(RowValues::Float(1.5).to_cell(), "1.5");
    }
}
