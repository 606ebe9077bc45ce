use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("missing authorization header")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("invalid credential format")]
    InvalidCredentialFormat,

    #[error("credentials rejected")]
    Forbidden,

    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("credential store unavailable: {0}")]
    StorageUnavailable(#[from] SqlxError),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[source] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for GatewayError {
    fn from(e: figment::Error) -> Self {
        GatewayError::Config(Box::new(e))
    }
}

impl GatewayError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::BadRequest(_)
            | GatewayError::InvalidCredentialFormat
            | GatewayError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::StorageUnavailable(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Config(_)
            | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        // Storage and upstream details stay in the logs.
        let (code, message) = match &self {
            GatewayError::Unauthorized => ("UNAUTHORIZED", "Authorization header is required."),
            GatewayError::BadRequest(reason) => ("BAD_REQUEST", *reason),
            GatewayError::InvalidCredentialFormat => ("BAD_REQUEST", "invalid credential format"),
            GatewayError::Forbidden => ("FORBIDDEN", "Invalid credentials."),
            GatewayError::InvalidTarget(_) => ("INVALID_TARGET", "Request path has no upstream host."),
            GatewayError::UpstreamUnreachable(_) => ("BAD_GATEWAY", "Upstream service is unavailable."),
            GatewayError::PayloadTooLarge => ("PAYLOAD_TOO_LARGE", "request body too large"),
            GatewayError::StorageUnavailable(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Config(_)
            | GatewayError::Io(_) => ("INTERNAL_ERROR", "An internal server error occurred."),
        };
        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
