//! Treatment plan API entry point.

use anyhow::Result;
use treatment_plan_api::{server, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    tracing::info!("Treatment Plan API v{version} starting");

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;

    server::serve(&config, state).await
}

/// Initialize the tracing subscriber from `RUST_LOG`.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,treatment_plan_api=info,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
