//! Request fingerprints.
//!
//! A fingerprint is the SHA-256 of the resolved URL, the JSON payload and the
//! JSON header map, hex encoded. Header maps serialize with sorted keys, so
//! the order headers were inserted in never changes the result.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a request: cache key and in-flight registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed hex digest.
    pub fn from_hex(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the fingerprint of `(url, data, headers)`.
///
/// Missing data hashes like an empty object.
pub fn fingerprint(url: &str, data: Option<&Value>, headers: &BTreeMap<String, String>) -> Fingerprint {
    let data = match data {
        Some(value) => value.to_string(),
        None => "{}".to_string(),
    };
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let headers = Value::Object(headers).to_string();

    let mut input = String::with_capacity(url.len() + data.len() + headers.len());
    input.push_str(url);
    input.push_str(&data);
    input.push_str(&headers);

    Fingerprint(hex::encode(boring::sha::sha256(input.as_bytes())))
}
