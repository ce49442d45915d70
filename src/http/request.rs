//! Transport-agnostic request description
//!
//! A `RequestDescriptor` is what the helpers hand to the host's
//! authenticated client: method, target URL, headers, body, query and
//! whether the response should be parsed as JSON.

use crate::types::{JsonObject, JsonValue};

/// Generic HTTP request description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestDescriptor {
    /// HTTP verb, forwarded verbatim
    pub method: String,
    /// Absolute target URL
    pub uri: String,
    /// Headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Request body; never an empty structure
    pub body: Option<JsonValue>,
    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
    /// Treat body and response as JSON
    pub json: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for the given method and URL
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the body. Empty structures are dropped instead of being sent as `{}`.
    #[must_use]
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = if is_empty_body(&body) {
            None
        } else {
            Some(body)
        };
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add every entry of a JSON object as query parameters
    #[must_use]
    pub fn query_object(mut self, query: &JsonObject) -> Self {
        self.query.extend(query_pairs(query));
        self
    }

    /// Set the JSON flag
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Whether a body counts as empty: `null`, `{}` or `[]`
pub fn is_empty_body(body: &JsonValue) -> bool {
    match body {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Serialize a JSON object into query pairs.
///
/// Strings are used as-is, numbers and booleans via their JSON text, arrays
/// are joined with `,` and nested objects become compact JSON. `null`
/// entries are skipped.
pub fn query_pairs(query: &JsonObject) -> Vec<(String, String)> {
    query
        .iter()
        .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn query_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        JsonValue::Object(_) => Some(value.to_string()),
    }
}
