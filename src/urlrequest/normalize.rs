//! Request normalization.
//!
//! Fills in everything the dispatcher relies on: absolute URL, upper-case
//! method, merged headers, timeout, callbacks, GET query string and, last,
//! the fingerprint. A request that already has a fingerprint is left alone.

use crate::base::neterror::NetError;
use crate::http::requestbody::encode_query;
use crate::http::response::{Payload, RequestError};
use crate::urlrequest::context::NetContext;
use crate::urlrequest::fingerprint::{fingerprint, Fingerprint};
use crate::urlrequest::request::Request;
use http::Method;
use std::collections::BTreeMap;

const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Normalize `request` in place and return its fingerprint.
pub fn normalize(ctx: &NetContext, request: &mut Request) -> Result<Fingerprint, NetError> {
    if let Some(fp) = &request.fingerprint {
        return Ok(fp.clone());
    }

    let url = resolve_url(&ctx.config().base_url, &request.url);
    let method = normalize_method(&request.method)?;
    let headers = merge_headers(ctx.default_headers(), &request.headers);

    let query = match &request.data {
        Some(data) if method == Method::GET => Some(encode_query(data)?),
        _ => None,
    };

    request.url = match query {
        Some(query) => {
            request.data = None;
            append_query(url, &query)
        }
        None => url,
    };
    request.method = method;
    request.headers = headers;
    if request.timeout.is_none() {
        request.timeout = Some(ctx.config().timeout_duration());
    }
    if request.on_success.is_none() {
        request.on_success = Some(Box::new(|_: Payload| {}));
    }
    if request.on_error.is_none() {
        let handler = ctx.error_handler();
        request.on_error = Some(Box::new(move |e: RequestError| handler(e)));
    }

    let fp = fingerprint(&request.url, request.data.as_ref(), &request.headers);
    request.fingerprint = Some(fp.clone());
    Ok(fp)
}

/// Join a relative path onto `base`. URLs carrying `://` are kept as-is.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.contains("://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

fn normalize_method(method: &Method) -> Result<Method, NetError> {
    let upper = method.as_str().to_ascii_uppercase();
    let method = Method::from_bytes(upper.as_bytes()).map_err(|_| NetError::MethodNotSupported)?;
    if SUPPORTED_METHODS.contains(&method) {
        Ok(method)
    } else {
        Err(NetError::MethodNotSupported)
    }
}

/// Header names compare case-insensitively, so both sides are lower-cased
/// before the request's own values are laid over the defaults.
fn merge_headers(
    defaults: BTreeMap<String, String>,
    own: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = defaults
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect();
    for (k, v) in own {
        merged.insert(k.to_ascii_lowercase(), v.clone());
    }
    merged
}

fn append_query(mut url: String, query: &str) -> String {
    if query.is_empty() {
        return url;
    }
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(query);
    url
}
