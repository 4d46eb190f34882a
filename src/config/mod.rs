mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path).await
}

pub async fn load_from(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();
    debug!("Loading configuration from: {}", config_path.display());

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;
    config.validate()?;

    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if pipeline.window_size == 0 {
            return Err(Error::config("pipeline.window_size must be greater than zero"));
        }
        if !pipeline.threshold_min.is_finite() || !pipeline.threshold_max.is_finite() {
            return Err(Error::config("pipeline thresholds must be finite"));
        }
        if pipeline.threshold_min >= pipeline.threshold_max {
            return Err(Error::config(format!(
                "pipeline.threshold_min ({}) must be below pipeline.threshold_max ({})",
                pipeline.threshold_min, pipeline.threshold_max
            )));
        }
        Ok(())
    }
}

impl LogsConfig {
    /// `RUST_LOG`, when set, replaces the configured level.
    pub fn with_env_override(&self) -> Self {
        match env::var("RUST_LOG") {
            Ok(level) => Self { level },
            Err(_) => self.clone(),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level.parse::<LevelFilter>().map_err(|_| {
            Error::config(format!(
                "invalid log level '{}', expected one of: error, warn, info, debug, trace",
                self.level
            ))
        })
    }
}
