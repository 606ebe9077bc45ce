use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::str::FromStr;

use crate::db::CredentialStore;
use crate::error::GatewayError;

/// Authorization schemes the gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Token,
    Basic,
}

impl FromStr for AuthScheme {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("token") {
            Ok(AuthScheme::Token)
        } else if s.eq_ignore_ascii_case("basic") {
            Ok(AuthScheme::Basic)
        } else {
            Err(GatewayError::BadRequest("invalid auth header"))
        }
    }
}

impl AuthScheme {
    /// Check `material` with the backend matching this scheme.
    pub async fn authenticate(
        self,
        store: &CredentialStore,
        material: &str,
    ) -> Result<bool, GatewayError> {
        match self {
            AuthScheme::Token => TokenBackend.authenticate(store, material).await,
            AuthScheme::Basic => BasicBackend.authenticate(store, material).await,
        }
    }
}

/// Opaque bearer tokens; a token is valid while its row exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBackend;

impl TokenBackend {
    pub async fn authenticate(
        &self,
        store: &CredentialStore,
        material: &str,
    ) -> Result<bool, GatewayError> {
        Ok(store.get_token(material).await?.is_some())
    }
}

/// base64 `username:password` checked against the stored SHA-256 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicBackend;

impl BasicBackend {
    /// Decode `material` into `(username, password)`, splitting on the first `:`.
    pub fn parse_credentials(material: &str) -> Result<(String, String), GatewayError> {
        let decoded = STANDARD
            .decode(material)
            .map_err(|_| GatewayError::InvalidCredentialFormat)?;
        let decoded = String::from_utf8(decoded).map_err(|_| GatewayError::InvalidCredentialFormat)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(GatewayError::InvalidCredentialFormat)?;
        Ok((username.to_string(), password.to_string()))
    }

    pub async fn authenticate(
        &self,
        store: &CredentialStore,
        material: &str,
    ) -> Result<bool, GatewayError> {
        let (username, password) = Self::parse_credentials(material)?;
        match store.get_user(&username).await? {
            Some(user) => Ok(user.check_password(&password)),
            None => Ok(false),
        }
    }
}
