//! Shopwatch — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the news pipeline behind the
//! refresh/status/news routes.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shopwatch::api::{self, AppState};
use shopwatch::config::Credentials;
use shopwatch::metrics::Metrics;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopwatch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let creds = Credentials::load_default()?;
    let metrics = Metrics::init();
    let state = AppState::new(creds);

    // Mirror the dashboard's load-time refresh when asked to.
    if std::env::var("SHOPWATCH_RUN_ON_START").is_ok_and(|v| v == "1") {
        api::try_start_run(&state);
    }

    let router = api::router(state).merge(metrics.router());
    let addr = std::env::var("SHOPWATCH_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
