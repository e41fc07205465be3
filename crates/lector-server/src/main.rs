//! Lector server entry point

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lector_config::Settings;
use lector_server::{create_router, AppState};
use lector_tts::{Retrying, RetryPolicy, SpeechCache, StubSynthesizer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let settings = Settings::load(Some(Path::new("lector.toml")))?;
    tracing::info!("Starting lector server v{}", env!("CARGO_PKG_VERSION"));

    let cache = SpeechCache::open(&settings.paths.cache_dir)?;
    tracing::info!(dir = %settings.paths.cache_dir, "Opened speech cache");

    let retry = RetryPolicy {
        max_attempts: settings.tts.max_retries,
        base: Duration::from_millis(settings.tts.backoff_base_ms),
        ..RetryPolicy::default()
    };
    let provider = Arc::new(Retrying::new(StubSynthesizer::default(), retry));

    let state = AppState::new(settings.clone(), cache, provider);
    let app = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lector=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
