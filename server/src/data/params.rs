//! Values bound to named query parameters

use sqlx::query::Query;
use sqlx::{Database, Encode, Type};

/// A value passed alongside a query and substituted by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BoundValue {
    /// Convert a JSON request value into a bindable value.
    ///
    /// Arrays and objects are bound as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<String> for BoundValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for BoundValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Ordered mapping from parameter name to value, unique by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    entries: Vec<(String, BoundValue)>,
}

impl BoundParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing binding in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BoundValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<BoundValue>> FromIterator<(K, V)> for BoundParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Bind positional values onto a prepared query, in order
pub(crate) fn bind_values<'q, DB>(
    mut query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    values: Vec<BoundValue>,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
{
    for value in values {
        query = match value {
            BoundValue::Null => query.bind(None::<String>),
            BoundValue::Bool(b) => query.bind(b),
            BoundValue::Int(i) => query.bind(i),
            BoundValue::Float(f) => query.bind(f),
            BoundValue::Text(s) => query.bind(s),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = BoundParams::new();
        params.insert("a", "1");
        params.insert("b", "2");
        params.insert("a", "3");

        assert_eq!(params.len(), 2);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(params.get("a"), Some(&BoundValue::Text("3".into())));
    }

    #[test]
    fn test_bound_value_from_json() {
        assert_eq!(BoundValue::from_json(&serde_json::json!(null)), BoundValue::Null);
        assert_eq!(BoundValue::from_json(&serde_json::json!(true)), BoundValue::Bool(true));
        assert_eq!(BoundValue::from_json(&serde_json::json!(42)), BoundValue::Int(42));
        assert_eq!(BoundValue::from_json(&serde_json::json!(1.5)), BoundValue::Float(1.5));
        assert_eq!(
            BoundValue::from_json(&serde_json::json!("ann")),
            BoundValue::Text("ann".into())
        );
        assert_eq!(
            BoundValue::from_json(&serde_json::json!([1, 2])),
            BoundValue::Text("[1,2]".into())
        );
    }
}
