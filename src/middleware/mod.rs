pub mod auth;

pub use auth::{parse_authorization, require_credentials};
