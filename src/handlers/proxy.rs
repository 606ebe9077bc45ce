use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
};

use crate::error::GatewayError;
use crate::router::GatewayState;
use crate::service::path_resolver::{inbound_scheme, resolve_target};

/// Catch-all handler behind the credential check: resolve the upstream from
/// the path, then forward the buffered request to it.
pub async fn proxy_handler(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, GatewayError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::BadRequest("unreadable request body")
        }
    })?;

    let target = resolve_target(uri.path(), inbound_scheme(&uri))?;
    state
        .proxy
        .forward(method, target, uri.query(), &headers, body)
        .await
}
