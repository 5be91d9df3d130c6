// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use grid_telemetry::infrastructure::config::load_settings;
use grid_telemetry::infrastructure::http_audit_source::HttpAuditSource;
use grid_telemetry::infrastructure::websocket_feed::WebSocketFeed;
use grid_telemetry::presentation::{self, app_state::AppState};
use grid_telemetry::Dashboard;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration; any invalid value refuses startup
    let settings = load_settings()?;

    // Wire the core to its transports
    let mut dashboard = Dashboard::new(
        Arc::new(WebSocketFeed::new()),
        Arc::new(HttpAuditSource::new()),
        &settings.core_settings(),
    )?;
    dashboard.start_stream(&settings.stream.endpoint)?;
    dashboard.start_audit(&settings.audit.endpoint, settings.audit_interval())?;

    let state = Arc::new(AppState {
        view: dashboard.view(),
    });
    let router = presentation::router(state);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr()?).await?;
    tracing::info!(address = %listener.local_addr()?, "serving dashboard view model");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    // The dashboard's event loop runs on this task until Ctrl-C
    dashboard.run(shutdown_signal()).await;

    let _ = stop_tx.send(true);
    server.await??;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
