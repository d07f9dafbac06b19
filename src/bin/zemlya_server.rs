//! HTTP server binary of the «Zemlya Prosto» service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zemlya_prosto::api::{self, AppState};
use zemlya_prosto::config::Config;
use zemlya_prosto::service::PlotService;
use zemlya_prosto::store::MemoryStore;
use zemlya_prosto::workflow::StubWorkflow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zemlya_prosto=info,tower_http=debug".into()),
        )
        .init();
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(PlotService::new(store, Arc::new(StubWorkflow::new())));
    let app = api::router(AppState { service });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("«Земля просто» HTTP server listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_grace))
        .await?;

    info!("server stopped cleanly");
    Ok(())
}

/// Completes once SIGINT or SIGTERM arrives. A watchdog aborts the process
/// if in-flight connections do not drain within the grace period.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => warn!(%err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("graceful shutdown grace period expired, aborting");
        std::process::exit(1);
    });
}
