//! Request dispatch.
//!
//! The decision runs in a fixed order:
//! 1. fresh cache entry (or any entry when offline) answers the request;
//! 2. offline without cache rejects it before any network call;
//! 3. otherwise the request goes to a new transport handle and the call
//!    returns at once. The classifier finishes it when the handle completes.

use crate::base::neterror::NetError;
use crate::events::NetEvent;
use crate::http::requestbody::RequestBody;
use crate::http::response::{Mime, RawResponse};
use crate::http::transport::TransportHandle;
use crate::urlrequest::classifier;
use crate::urlrequest::context::NetContext;
use crate::urlrequest::fingerprint::Fingerprint;
use crate::urlrequest::normalize::normalize;
use crate::urlrequest::request::Request;
use http::Method;
use std::sync::Arc;

const CONTENT_TYPE: &str = "content-type";
const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Dispatch `request` and return its fingerprint.
///
/// `Err` is a pre-flight rejection: offline with no usable cache
/// ([`NetError::InternetDisconnected`]), or a request that cannot be
/// normalized or encoded. No callback runs in that case.
pub fn dispatch(ctx: &Arc<NetContext>, mut request: Request) -> Result<Fingerprint, NetError> {
    let fingerprint = normalize(ctx, &mut request)?;

    if ctx.config().debug {
        tracing::debug!(%fingerprint, request = ?request, "dispatching request");
    }

    let online = ctx.is_online();

    if request.cache && request.method == Method::GET {
        if let Some(entry) = ctx.cache().and_then(|cache| cache.get(&fingerprint, !online)) {
            if !online {
                ctx.emit(NetEvent::OfflineServedFromCache {
                    fingerprint: fingerprint.clone(),
                });
            }
            if let Some(complete) = request.on_complete.take() {
                complete();
            }
            tracing::debug!(%fingerprint, online, "served from cache");
            if let Some(success) = request.on_success.take() {
                success(entry.payload);
            }
            return Ok(fingerprint);
        }
    }

    if !online {
        ctx.emit(NetEvent::OfflineNoCache {
            fingerprint: fingerprint.clone(),
        });
        ctx.notify_offline();
        tracing::warn!(%fingerprint, url = %request.url, "offline and nothing cached");
        return Err(NetError::InternetDisconnected);
    }

    let (body, content_type) = encode_body(&mut request)?;

    if !request.silent {
        ctx.emit(NetEvent::RequestStarted {
            fingerprint: fingerprint.clone(),
            event_name: request.event_name.clone(),
        });
    }

    let handle = ctx.transport().create();
    ctx.registry().insert(fingerprint.clone(), Arc::clone(&handle));

    if let Err(e) = configure(&handle, &request, content_type) {
        tracing::debug!(%fingerprint, error = %e, "transport rejected request");
        classifier::on_complete(ctx, request, &fingerprint, RawResponse::failed(e));
        return Ok(fingerprint);
    }

    let hook_ctx = Arc::clone(ctx);
    let hook_fingerprint = fingerprint.clone();
    handle.send(
        body,
        Box::new(move |raw: RawResponse| {
            classifier::on_complete(&hook_ctx, request, &hook_fingerprint, raw);
        }),
    );

    Ok(fingerprint)
}

fn configure(
    handle: &Arc<dyn TransportHandle>,
    request: &Request,
    content_type: Option<&'static str>,
) -> Result<(), NetError> {
    handle.open(&request.method, &request.url)?;
    for (name, value) in &request.headers {
        handle.set_header(name, value)?;
    }
    if let Some(content_type) = content_type {
        handle.set_header(CONTENT_TYPE, content_type)?;
    }
    if let Some(timeout) = request.timeout {
        handle.set_timeout(timeout);
    }
    handle.set_caching(false);
    Ok(())
}

/// Pick the wire body and, when the request did not set one, its content type.
///
/// A pre-encoded body wins. Structured data is sent as JSON when the request
/// declares a JSON content type or forces JSON handling, and as a form
/// otherwise.
fn encode_body(request: &mut Request) -> Result<(RequestBody, Option<&'static str>), NetError> {
    let declared = request.headers.get(CONTENT_TYPE).map(|v| {
        v.split(';')
            .next()
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case(JSON)
    });

    if let Some(body) = request.body.take() {
        return Ok((body, None));
    }

    let data = match &request.data {
        Some(data) => data,
        None => return Ok((RequestBody::Empty, None)),
    };

    let as_json = declared.unwrap_or(false) || request.mime == Some(Mime::Json);
    let body = if as_json {
        RequestBody::json(data)?
    } else {
        RequestBody::form(data)?
    };

    let content_type = match declared {
        Some(_) => None,
        None if as_json => Some(JSON),
        None => Some(FORM),
    };
    Ok((body, content_type))
}
