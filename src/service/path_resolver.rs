//! Maps `/<domain>[/<remainder>]` onto an upstream URL.
//!
//! The first path segment names the upstream. It may carry its own scheme
//! (`/https://host/...`, or `/https:/host/...` once a client has collapsed the
//! double slash); otherwise the scheme the request arrived on is used. The
//! remainder becomes the upstream path, `/` when empty.

use axum::http::Uri;
use url::Url;

use crate::error::GatewayError;

const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Scheme the request arrived on; plain `http` unless the request line
/// carried an absolute URI.
pub fn inbound_scheme(uri: &Uri) -> &str {
    uri.scheme_str().unwrap_or("http")
}

pub fn resolve_target(path: &str, inbound_scheme: &str) -> Result<Url, GatewayError> {
    let stripped = path.trim_matches('/');
    let (domain, remainder) = split_domain(stripped, inbound_scheme)?;

    let mut url = Url::parse(&domain)
        .map_err(|e| GatewayError::InvalidTarget(format!("{domain}: {e}")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(GatewayError::InvalidTarget(format!("{domain}: missing host")));
    }

    url.set_path(if remainder.is_empty() { "/" } else { remainder });
    Ok(url)
}

/// Returns the schemed upstream base and the untouched remainder.
fn split_domain<'a>(
    stripped: &'a str,
    inbound_scheme: &str,
) -> Result<(String, &'a str), GatewayError> {
    if let Some((scheme, rest)) = embedded_scheme(stripped) {
        if !is_supported(scheme) {
            return Err(GatewayError::InvalidTarget(format!(
                "unsupported scheme {scheme}"
            )));
        }
        let (host, remainder) = rest.split_once('/').unwrap_or((rest, ""));
        if host.is_empty() {
            return Err(GatewayError::InvalidTarget(format!("{scheme}: missing host")));
        }
        return Ok((format!("{}://{host}", scheme.to_ascii_lowercase()), remainder));
    }

    let (host, remainder) = stripped.split_once('/').unwrap_or((stripped, ""));
    if host.is_empty() {
        return Err(GatewayError::InvalidTarget("empty domain".to_string()));
    }
    if !is_supported(inbound_scheme) {
        return Err(GatewayError::InvalidTarget(format!(
            "unsupported scheme {inbound_scheme}"
        )));
    }
    Ok((format!("{inbound_scheme}://{host}"), remainder))
}

/// `<scheme>://rest` or `<scheme>:/rest` at the start of the path, for any
/// syntactically valid scheme. A bare `host:port` never matches because the
/// port is not followed by a slash.
fn embedded_scheme(stripped: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = stripped.split_once(':')?;
    if !is_scheme_syntax(scheme) {
        return None;
    }
    if rest.is_empty() {
        return Some((scheme, rest));
    }
    let rest = rest.strip_prefix('/')?;
    Some((scheme, rest.strip_prefix('/').unwrap_or(rest)))
}

fn is_scheme_syntax(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_supported(scheme: &str) -> bool {
    SUPPORTED_SCHEMES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(scheme))
}
