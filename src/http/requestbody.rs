//! Request body for POST/PUT/PATCH operations.

use crate::base::neterror::NetError;
use bytes::Bytes;
use serde_json::Value;

/// Body handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET, or nothing to send).
    #[default]
    Empty,
    /// Body with raw bytes.
    Bytes(Bytes),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    /// Encode a payload as a JSON document.
    pub fn json(data: &Value) -> Result<Self, NetError> {
        serde_json::to_vec(data)
            .map(Into::into)
            .map_err(|_| NetError::ContentDecodingFailed)
    }

    /// Encode a flat object as `application/x-www-form-urlencoded`.
    pub fn form(data: &Value) -> Result<Self, NetError> {
        encode_query(data).map(Into::into)
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes(b) => b.is_empty(),
        }
    }

    /// Get the length of the body in bytes.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b,
        }
    }
}

/// Serialize a flat JSON object into `k=v&k2=v2`.
///
/// Strings are sent as-is, numbers and booleans by their JSON text, `null`
/// as an empty value. Nested arrays and objects are rejected.
pub fn encode_query(data: &Value) -> Result<String, NetError> {
    let map = match data {
        Value::Object(map) => map,
        Value::Null => return Ok(String::new()),
        _ => return Err(NetError::QuerySerialization),
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => return Err(NetError::QuerySerialization),
        };
        pairs.push((key.as_str(), value));
    }

    serde_urlencoded::to_string(&pairs).map_err(|_| NetError::QuerySerialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body() {
        let body = RequestBody::Empty;
        assert!(body.is_empty());
        assert_eq!(body.len(), 0);
        assert!(body.into_bytes().is_empty());
    }

    #[test]
    fn test_from_str() {
        let body: RequestBody = "test".into();
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(RequestBody::default().is_empty());
    }

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(&json!({"name": "widget"})).unwrap();
        assert_eq!(body.into_bytes(), Bytes::from_static(br#"{"name":"widget"}"#));
    }

    #[test]
    fn test_form_body() {
        let body = RequestBody::form(&json!({"a": 1, "b": "x y"})).unwrap();
        assert_eq!(body.into_bytes(), Bytes::from_static(b"a=1&b=x+y"));
    }

    #[test]
    fn test_encode_query_scalars() {
        let q = encode_query(&json!({"flag": true, "n": 2.5, "none": null})).unwrap();
        assert_eq!(q, "flag=true&n=2.5&none=");
    }

    #[test]
    fn test_encode_query_rejects_nested() {
        assert_eq!(
            encode_query(&json!({"a": {"b": 1}})),
            Err(NetError::QuerySerialization)
        );
        assert_eq!(encode_query(&json!([1, 2])), Err(NetError::QuerySerialization));
    }
}
