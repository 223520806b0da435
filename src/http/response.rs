//! Response-side value types.
//!
//! A transport completes with a [`RawResponse`]. The classifier turns it into
//! [`ResponseInfo`] (MIME and expiry) and a parsed [`Payload`], or into a
//! [`RequestError`] for the caller's error callback.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, EXPIRES};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::{self, well_known::Rfc2822};
use time::parsing::Parsed;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Relative cache lifetime header, in seconds from now.
pub const X_CACHE_TTL: &str = "x-cache-ttl";

/// How a response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mime {
    /// Structured JSON document.
    Json,
    /// Bytes passed through untouched.
    #[default]
    Raw,
}

impl Mime {
    /// `Json` when the `Content-Type` media type is `application/json`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Mime> {
        let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let essence = value.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("application/json") {
            Some(Mime::Json)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mime::Json => "json",
            Mime::Raw => "raw",
        }
    }

    pub fn parse(s: &str) -> Option<Mime> {
        match s {
            "json" => Some(Mime::Json),
            "raw" => Some(Mime::Raw),
            _ => None,
        }
    }
}

/// A response body after MIME handling.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(Bytes),
}

impl Payload {
    /// Decode a body according to its MIME.
    ///
    /// A body that claims to be JSON but does not parse becomes `Json(Null)`.
    pub fn parse(mime: Mime, body: &Bytes) -> Payload {
        match mime {
            Mime::Json => match serde_json::from_slice(body) {
                Ok(value) => Payload::Json(value),
                Err(e) => {
                    tracing::debug!(error = %e, len = body.len(), "response body is not valid JSON");
                    Payload::Json(Value::Null)
                }
            },
            Mime::Raw => Payload::Raw(body.clone()),
        }
    }

    pub fn mime(&self) -> Mime {
        match self {
            Payload::Json(_) => Mime::Json,
            Payload::Raw(_) => Mime::Raw,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Raw(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Raw(b) => Some(b),
            Payload::Json(_) => None,
        }
    }

    /// Serialized form, suitable for storage.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Payload::Json(v) => Bytes::from(v.to_string()),
            Payload::Raw(b) => b.clone(),
        }
    }

    /// Deserialize a JSON payload into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        match self {
            Payload::Json(v) => {
                serde_json::from_value(v.clone()).map_err(|_| NetError::ContentDecodingFailed)
            }
            Payload::Raw(b) => {
                serde_json::from_slice(b).map_err(|_| NetError::ContentDecodingFailed)
            }
        }
    }

    /// Server-provided error text: `error.message`, or `error` itself.
    pub fn error_message(&self) -> Option<String> {
        let error = self.as_json()?.get("error")?;
        match error.get("message") {
            Some(Value::String(message)) => return Some(message.clone()),
            Some(message) if !message.is_null() => return Some(message.to_string()),
            _ => {}
        }
        match error {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// What a transport hands back when a call completes.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status, `0` when no response was received.
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub success: bool,
    /// Transport-level failure, if any.
    pub error: Option<NetError>,
}

impl RawResponse {
    /// A received response; success means a 2xx status.
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            success: (200..300).contains(&status),
            error: None,
        }
    }

    /// A call that failed before a response arrived.
    pub fn failed(error: NetError) -> Self {
        Self {
            status: 0,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            success: false,
            error: Some(error),
        }
    }
}

/// Response metadata used to parse and cache a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseInfo {
    pub mime: Mime,
    /// Absolute expiry in epoch seconds; `None` means not cacheable.
    pub expires_at: Option<i64>,
}

impl ResponseInfo {
    /// Derive metadata from response headers and request overrides.
    ///
    /// MIME: override, then `Content-Type`, then raw.
    /// Expiry: `Expires`, then `X-Cache-Ttl`, then the request's own expiry.
    pub fn resolve(
        headers: &HeaderMap,
        now: i64,
        mime_override: Option<Mime>,
        expire_override: Option<i64>,
    ) -> Self {
        let mime = mime_override
            .or_else(|| Mime::from_headers(headers))
            .unwrap_or_default();

        let expires_at = expires_header(headers)
            .or_else(|| ttl_header(headers).map(|ttl| now.saturating_add(ttl)))
            .or(expire_override);

        Self { mime, expires_at }
    }

    /// Whether an expiry was determined.
    pub fn is_cacheable(&self) -> bool {
        self.expires_at.is_some_and(|t| t > 0)
    }
}

fn expires_header(headers: &HeaderMap) -> Option<i64> {
    parse_http_date(headers.get(EXPIRES)?.to_str().ok()?.trim())
}

const RFC_850: &str = "[weekday repr:long], [day]-[month repr:short]-[year repr:last_two] \
                       [hour]:[minute]:[second] GMT";
const ASCTIME: &str = "[weekday repr:short] [month repr:short] [day padding:space] \
                       [hour]:[minute]:[second] [year]";

/// Parse an HTTP-date in any of its three forms, as epoch seconds.
fn parse_http_date(value: &str) -> Option<i64> {
    OffsetDateTime::parse(value, &Rfc2822)
        .ok()
        .map(OffsetDateTime::unix_timestamp)
        .or_else(|| parse_rfc850(value))
        .or_else(|| parse_asctime(value))
}

fn parse_rfc850(value: &str) -> Option<i64> {
    let items = format_description::parse(RFC_850).ok()?;
    let mut parsed = Parsed::new();
    let rest = parsed.parse_items(value.as_bytes(), &items).ok()?;
    if !rest.is_empty() {
        return None;
    }
    // Two-digit years 70-99 are 19xx.
    let last_two = i32::from(parsed.year_last_two()?);
    parsed.set_year(if last_two >= 70 { 1900 + last_two } else { 2000 + last_two })?;

    let date = Date::try_from(parsed).ok()?;
    let time = Time::try_from(parsed).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp())
}

fn parse_asctime(value: &str) -> Option<i64> {
    let items = format_description::parse(ASCTIME).ok()?;
    PrimitiveDateTime::parse(value, &items)
        .ok()
        .map(|t| t.assume_utc().unix_timestamp())
}

fn ttl_header(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(X_CACHE_TTL)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
}

/// What the error callback receives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct RequestError {
    pub message: String,
    /// HTTP status, `0` when no response was received.
    pub code: u16,
}
