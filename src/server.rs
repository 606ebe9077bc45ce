use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::ForwardingProxy;
use crate::config::Config;
use crate::db::{CredentialStore, ENTITIES};
use crate::error::GatewayError;
use crate::router::{GatewayState, gateway_router};

/// Run the gateway until Ctrl+C or SIGTERM.
///
/// The credential store is opened before anything is bound; if that fails
/// no connection is ever accepted. Once open it is closed on every exit path.
pub async fn run(cfg: Config) -> Result<(), GatewayError> {
    let store = CredentialStore::open(&cfg.db_name, ENTITIES).await?;
    serve(&cfg, store).await
}

/// Serve on an already opened store, closing it however serving ends.
pub async fn serve(cfg: &Config, store: CredentialStore) -> Result<(), GatewayError> {
    let outcome = serve_until_shutdown(cfg, store.clone()).await;
    if let Err(e) = &outcome {
        error!(error = %e, "gateway stopped with error");
    }
    store.close().await;
    outcome
}

async fn serve_until_shutdown(cfg: &Config, store: CredentialStore) -> Result<(), GatewayError> {
    let proxy = ForwardingProxy::new(cfg.upstream_timeout())?;
    let app = gateway_router(GatewayState::new(store, proxy), cfg.body_limit);

    let listener = TcpListener::bind(cfg.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
