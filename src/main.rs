use anyhow::{Context, Result};
use avocado_forecast::{config, server};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging depends on the config, so config errors go to stderr.
    let config = config::load().await.context("failed to load configuration")?;

    let logs = config.server.logs.with_env_override();
    let level = logs.level_filter()?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .json()
        .init();

    info!(
        level = %level,
        window = config.pipeline.window_size,
        "Starting avocado sales forecast server"
    );

    if let Err(e) = server::run(config).await {
        error!("Forecast server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
