use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::any,
};

use crate::api::ForwardingProxy;
use crate::db::CredentialStore;
use crate::handlers::proxy::proxy_handler;
use crate::middleware::require_credentials;

/// Shared by every request; the store handle is read-only.
#[derive(Clone)]
pub struct GatewayState {
    pub store: CredentialStore,
    pub proxy: ForwardingProxy,
}

impl GatewayState {
    pub fn new(store: CredentialStore, proxy: ForwardingProxy) -> Self {
        Self { store, proxy }
    }
}

/// Every method on every path: credential check, then resolve and forward.
pub fn gateway_router(state: GatewayState, body_limit: usize) -> Router {
    Router::new()
        .route("/", any(proxy_handler))
        .route("/{*path}", any(proxy_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_credentials,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
