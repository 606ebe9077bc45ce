//! Credential storage.
//!
//! Layout:
//! - `models.rs`: row types for users and tokens, password digest helper
//! - `schema.rs`: per-entity table layout and the registered entity list
//! - `sqlite.rs`: the SQLite-backed `CredentialStore`

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Token, User, hash_password};
pub use schema::{ENTITIES, Entity};
pub use sqlite::{CredentialStore, SqlitePool};
