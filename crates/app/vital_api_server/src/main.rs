//! Vital chat relay server binary.
//!
//! Serves `POST /api/chat` and `GET /api/health` until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vital_core::ProviderConfig;
use vital_core::provider::gemini::GeminiClient;

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "vital_api_server", about = "Vital chat relay server", version)]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Gemini model name.
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Provider call timeout in seconds.
    #[arg(long, env = "GEMINI_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout stays clean for process supervisors.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,vital_api=debug,vital_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut provider = ProviderConfig::from_env()?;
    if let Some(model) = args.model.filter(|m| !m.trim().is_empty()) {
        provider.model = model;
    }
    if let Some(secs) = args.timeout_secs.filter(|s| *s > 0) {
        provider.timeout = std::time::Duration::from_secs(secs);
    }

    if provider.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; chat requests will fail until it is configured");
    }

    info!(
        model = %provider.model,
        base_url = %provider.base_url,
        timeout_secs = provider.timeout.as_secs(),
        "configuring Gemini provider"
    );

    let config = vital_api::config::ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        provider,
    };

    let generator = GeminiClient::new(&config.provider)?;
    let state = vital_api::AppState::new(config.clone(), Arc::new(generator));
    let app = vital_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received Ctrl-C, shutting down");
                    shutdown.cancel();
                }
                Err(e) => warn!("cannot listen for Ctrl-C: {e}"),
            }
        }
    });

    info!(addr = %local_addr, "chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
