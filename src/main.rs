use std::env;
use std::path::PathBuf;

use rolodex::config::Configuration;
use rolodex::{app, initialize_state, telemetry};
use tokio::net::TcpListener;
use tokio::signal;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let path = env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_default();
    let config = Configuration::default().path(path).read();

    let guard = telemetry::init(&config.telemetry)?;

    let addr = config.socket_addr()?;
    let state = initialize_state(config).await?;
    let records = state.records.clone();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server is listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    records.close().await;
    tracing::info!("server stopped");
    guard.shutdown();

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
