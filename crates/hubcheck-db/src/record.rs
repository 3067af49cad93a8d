//! Rows returned by the gateway.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row: column name → JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    /// Raw JSON value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Whether the record has a column named `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// String value of a column; numbers are rendered as text.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer value of a column.
    ///
    /// Accepts numeric strings too, since NUMERIC/DECIMAL and some
    /// driver-specific counts arrive as text.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.0.get(column)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok())),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value of a column; `0`/`1` integers count as booleans.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.0.get(column)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            _ => None,
        }
    }

    /// Whether the column is absent or SQL NULL.
    #[must_use]
    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.0.get(column), None | Some(Value::Null))
    }

    /// Column names.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the underlying JSON map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_numeric_accessors() {
        let r = record(json!({ "total_orders": "42", "count": 7, "amount": "19.99" }));
        assert_eq!(r.get_i64("total_orders"), Some(42));
        assert_eq!(r.get_i64("count"), Some(7));
        assert_eq!(r.get_i64("amount"), None);
        assert_eq!(r.get_str("count").as_deref(), Some("7"));
    }

    #[test]
    fn test_null_handling() {
        let r = record(json!({ "parent_id": null, "enabled": 1 }));
        assert!(r.is_null("parent_id"));
        assert!(r.is_null("missing"));
        assert_eq!(r.get_bool("enabled"), Some(true));
        assert_eq!(r.get_str("parent_id"), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let r = record(json!({ "order_id": "1042" }));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"order_id":"1042"}"#);
    }
}
