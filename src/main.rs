//! Vitalog API Server
//!
//! Run with: cargo run --bin vitalog
//!
//! # Configuration
//!
//! Read from `$VITALOG_CONFIG`, `~/.config/vitalog/config.toml` or
//! `./vitalog.toml`, with `VITALOG_*` environment overrides. `RUST_LOG`
//! overrides the configured log level.

use vitalog::api::{serve, AppState};
use vitalog::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    vitalog::logging::init(&config.logging);

    tracing::info!("Starting Vitalog API server v{}", env!("CARGO_PKG_VERSION"));

    let catalog = config.build_catalog()?;
    tracing::info!(
        categories = catalog.categories().len(),
        metrics = catalog.len(),
        "Metric catalog ready"
    );
    tracing::info!(
        max_upload_mb = config.api.max_upload_mb,
        max_datasets = config.api.max_datasets,
        "Upload limits"
    );

    let state = AppState::new(catalog, config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("Vitalog API server stopped");
    Ok(())
}
