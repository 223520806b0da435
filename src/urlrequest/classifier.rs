//! Response classifier.
//!
//! Runs exactly once per transport completion: clears the registry slot,
//! fires request-ended, derives MIME and expiry, writes the cache on a
//! cacheable success and finally calls the request's callback.

use crate::events::NetEvent;
use crate::http::httpcache::CacheEntry;
use crate::http::response::{Payload, RawResponse, RequestError, ResponseInfo};
use crate::urlrequest::context::NetContext;
use crate::urlrequest::fingerprint::Fingerprint;
use crate::urlrequest::request::Request;
use http::Method;

/// Handle a completed transport call for `request`.
pub fn on_complete(
    ctx: &NetContext,
    mut request: Request,
    fingerprint: &Fingerprint,
    raw: RawResponse,
) {
    ctx.registry().remove(fingerprint);

    if !request.silent {
        ctx.emit(NetEvent::RequestEnded {
            fingerprint: fingerprint.clone(),
            event_name: request.event_name.clone(),
        });
    }

    if let Some(complete) = request.on_complete.take() {
        complete();
    }

    let info = ResponseInfo::resolve(&raw.headers, ctx.now(), request.mime, request.expire);
    if ctx.config().debug {
        tracing::debug!(
            %fingerprint,
            status = raw.status,
            mime = info.mime.as_str(),
            expires_at = ?info.expires_at,
            "response info"
        );
    }

    let payload = Payload::parse(info.mime, &raw.body);

    if raw.success {
        if let (Some(cache), Some(expires_at)) = (ctx.cache(), info.expires_at) {
            if request.cache && request.method == Method::GET && info.is_cacheable() {
                tracing::debug!(%fingerprint, expires_at, "caching response");
                cache.set(CacheEntry::new(fingerprint.clone(), payload.clone(), expires_at));
            }
        }

        if let Some(success) = request.on_success.take() {
            success(payload);
        }
        return;
    }

    let message = payload
        .error_message()
        .unwrap_or_else(|| ctx.config().error_message.clone());
    tracing::error!(
        %fingerprint,
        url = %request.url,
        status = raw.status,
        error = ?raw.error,
        %message,
        "request failed"
    );

    let error = RequestError {
        message,
        code: raw.status,
    };
    match request.on_error.take() {
        Some(callback) => callback(error),
        None => (ctx.error_handler())(error),
    }
}
