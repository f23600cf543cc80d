//! Inbound request values

use serde_json::{Map, Value};

/// Request values available to an operation (query string and body fields)
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    values: Map<String, Value>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from query-string pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { values }
    }

    /// Overlay the fields of a JSON object; overlay values win
    pub fn extend_from_json(&mut self, body: &Value) {
        if let Value::Object(map) = body {
            for (k, v) in map {
                self.values.insert(k.clone(), v.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Value as text; `null`, arrays and objects yield `None`
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Value as integer; anything unparsable yields 0
    pub fn get_int(&self, name: &str) -> i64 {
        match self.values.get(name) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_int_parses_strings_and_numbers() {
        let mut req = RequestParams::from_pairs([("startIndex", "12"), ("count", "abc")]);
        req.insert("limit", 5);

        assert_eq!(req.get_int("startIndex"), 12);
        assert_eq!(req.get_int("count"), 0);
        assert_eq!(req.get_int("limit"), 5);
        assert_eq!(req.get_int("missing"), 0);
    }

    #[test]
    fn test_body_overrides_query() {
        let mut req = RequestParams::from_pairs([("name", "query")]);
        req.extend_from_json(&serde_json::json!({ "name": "body", "age": 3 }));

        assert_eq!(req.get_str("name").as_deref(), Some("body"));
        assert_eq!(req.get_str("age").as_deref(), Some("3"));
    }

    #[test]
    fn test_get_str_ignores_structured_values() {
        let mut req = RequestParams::new();
        req.extend_from_json(&serde_json::json!({ "tags": ["a"], "none": null }));

        assert_eq!(req.get_str("tags"), None);
        assert_eq!(req.get_str("none"), None);
    }
}
