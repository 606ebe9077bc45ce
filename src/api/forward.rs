use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, Method, header};
use axum::response::Response;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::error::GatewayError;

/// Relays one buffered request to an upstream and the upstream's answer back.
///
/// Redirects are never followed; a 3xx is handed to the caller as-is.
#[derive(Clone)]
pub struct ForwardingProxy {
    client: reqwest::Client,
}

impl ForwardingProxy {
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(GatewayError::HttpClient)?;
        Ok(Self { client })
    }

    pub async fn forward(
        &self,
        method: Method,
        target: Url,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, GatewayError> {
        let target = outbound_url(target, query);
        info!(%method, url = %target, "forwarding request");

        let upstream = self
            .client
            .request(method, target)
            .headers(outbound_headers(headers))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "upstream request failed");
                GatewayError::UpstreamUnreachable(e)
            })?;

        let status = upstream.status();
        let headers = relayed_headers(upstream.headers());
        let body = upstream
            .bytes()
            .await
            .map_err(GatewayError::UpstreamUnreachable)?;
        info!(status = status.as_u16(), bytes = body.len(), "upstream responded");

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Attach the inbound raw query to the resolved target.
///
/// Existing percent-escapes and reserved characters pass through unchanged.
/// The one rewrite is `'`, which the URL parser escapes to `%27` in
/// http(s) queries; reqwest only accepts a parsed `Url`, so it cannot be
/// sent raw.
fn outbound_url(mut target: Url, query: Option<&str>) -> Url {
    target.set_query(query);
    target
}

/// Connection-scoped headers that never cross the gateway.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Inbound headers minus hop-by-hop ones, the gateway credential, and the
/// fields the client recomputes for the new connection.
fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if is_hop_by_hop(name)
            || *name == header::HOST
            || *name == header::AUTHORIZATION
            || *name == header::CONTENT_LENGTH
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
