use sha2::{Digest, Sha256};
use sqlx::FromRow;
use subtle::ConstantTimeEq;

/// Row of the `users` table.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub username: String,
    /// Hex SHA-256 of the password.
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl User {
    pub fn check_password(&self, raw_password: &str) -> bool {
        let candidate = hash_password(raw_password);
        candidate
            .as_bytes()
            .ct_eq(self.password_hash.as_bytes())
            .into()
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Row of the `tokens` table; the token string is the row identity.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Token {
    #[sqlx(rename = "token")]
    pub value: String,
}

/// Hex-encoded SHA-256 digest, the form passwords are stored in.
pub fn hash_password(raw_password: &str) -> String {
    hex::encode(Sha256::digest(raw_password.as_bytes()))
}
