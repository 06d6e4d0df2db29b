//! Flat result rows.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::types::Timestamp;
use crate::value::Value;
use std::sync::Arc;

/// Column names shared across all rows in a result set.
///
/// Wrapped in `Arc` so every row of one fetch points at the same names.
/// Positional rows carry an empty list.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    names: Vec<String>,
}

impl ColumnInfo {
    /// Create column info from names in select order.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Number of named columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the rows are positional only.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single flat tuple returned by a row source.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a row with its own column names.
    ///
    /// For multiple rows from the same result set, prefer `with_columns`
    /// to share the names.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            values,
            columns: Arc::new(ColumnInfo::new(column_names)),
        }
    }

    /// Create a row with shared column names.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Create a row carrying only positional values.
    pub fn positional(values: Vec<Value>) -> Self {
        Self::with_columns(Arc::default(), values)
    }

    /// Column names, empty for positional rows.
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    /// Number of values in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values in column order.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

/// Conversion from a column `Value` into a field type.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    fn from_value(value: &Value) -> Result<Self>;
}

fn type_error(expected: &'static str, value: &Value) -> Error {
    Error::Type(TypeError {
        expected,
        actual: value.type_name().to_string(),
        column: None,
    })
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| type_error("i64", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_error("String", value))
    }
}

impl FromValue for Timestamp {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_timestamp()
            .ok_or_else(|| type_error("Timestamp", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_row_access() {
        let row = Row::new(
            vec!["listings__id".to_string(), "listings__title".to_string()],
            vec![Value::BigInt(1), Value::Text("Bakery".to_string())],
        );

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some(&Value::BigInt(1)));
        assert_eq!(row.get(2), None);
        assert_eq!(row.column_names()[1], "listings__title");
    }

    #[test]
    fn positional_row_has_no_names() {
        let row = Row::positional(vec![Value::BigInt(1)]);
        assert!(row.column_names().is_empty());
        assert_eq!(row.as_slice(), &[Value::BigInt(1)]);
    }

    #[test]
    fn shared_columns() {
        let columns = Arc::new(ColumnInfo::new(vec!["id".to_string()]));
        let row1 = Row::with_columns(Arc::clone(&columns), vec![Value::BigInt(1)]);
        let row2 = Row::with_columns(Arc::clone(&columns), vec![Value::BigInt(2)]);

        assert!(std::ptr::eq(row1.column_names(), row2.column_names()));
        assert_eq!(Arc::strong_count(&columns), 3);
    }

    #[test]
    fn null_handling() {
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::BigInt(4)).unwrap(), Some(4));
        assert!(i64::from_value(&Value::Null).is_err());
    }

    #[test]
    fn text_is_not_an_integer() {
        let err = i64::from_value(&Value::Text("5".into())).unwrap_err();
        assert!(err.to_string().contains("TEXT"));
        assert_eq!(String::from_value(&Value::from("Bob")).unwrap(), "Bob");
    }

    #[test]
    fn timestamp_from_value() {
        let ts = Timestamp::from_value(&Value::Timestamp(5)).unwrap();
        assert_eq!(ts.as_micros(), 5);
        assert!(Timestamp::from_value(&Value::BigInt(5)).is_err());
    }
}
