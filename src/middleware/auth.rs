use axum::extract::{Request, State};
use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::GatewayError;
use crate::router::GatewayState;
use crate::service::auth_backend::AuthScheme;

/// Split `Authorization: <scheme> <material>` into its parts.
///
/// A missing or empty header is `Unauthorized`; anything else that does not
/// fit the shape, or names an unknown scheme, is `BadRequest`.
pub fn parse_authorization(headers: &HeaderMap) -> Result<(AuthScheme, &str), GatewayError> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Err(GatewayError::Unauthorized);
    };
    if raw.is_empty() {
        return Err(GatewayError::Unauthorized);
    }
    let value = raw
        .to_str()
        .map_err(|_| GatewayError::BadRequest("invalid auth header"))?;
    let (scheme, material) = value
        .split_once(' ')
        .ok_or(GatewayError::BadRequest("invalid auth header"))?;
    Ok((scheme.parse()?, material))
}

/// Admit the request only if its credentials check out against the store.
/// Nothing about the caller is attached to the request.
pub async fn require_credentials(
    State(state): State<GatewayState>,
    req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let (scheme, material) = parse_authorization(req.headers()).inspect_err(|e| {
        debug!(path = %req.uri().path(), error = %e, "rejecting request");
    })?;

    match scheme.authenticate(&state.store, material).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(?scheme, "credentials rejected");
            return Err(GatewayError::Forbidden);
        }
        Err(e) => {
            debug!(?scheme, error = %e, "authentication failed");
            return Err(e);
        }
    }

    Ok(next.run(req).await)
}
