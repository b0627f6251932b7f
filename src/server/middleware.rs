use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::AppState;
use crate::crypto::verify_signature;

/// Header carrying `sha1=<hex>`
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
/// Header carrying `sha256=<hex>`
pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";

/// Largest webhook body accepted for signature checks
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Reject signed webhooks whose HMAC does not match the configured secret.
///
/// Unsigned deliveries pass through untouched, as do all deliveries when no
/// secret is configured.
pub async fn signature_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(secret) = state.config.webhook_secret() else {
        return Ok(next.run(request).await);
    };

    let headers = request.headers();
    let signature = header(headers, SIGNATURE_HEADER).map(str::to_string);
    let signature256 = header(headers, SIGNATURE_256_HEADER).map(str::to_string);
    if signature.is_none() && signature256.is_none() {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if !verify_signature(
        &bytes,
        signature.as_deref(),
        signature256.as_deref(),
        Some(secret),
    ) {
        tracing::warn!("[googlemeet] Rejected webhook with invalid signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}
