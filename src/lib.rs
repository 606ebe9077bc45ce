pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod service;

pub use config::Config;
pub use db::CredentialStore;
pub use error::GatewayError;
pub use router::{GatewayState, gateway_router};
