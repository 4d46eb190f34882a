use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    /// Directory served under `/static`. Skipped when it does not exist.
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_scaler_path")]
    pub scaler_path: String,
}

/// Shape of the input window and the training range used for the
/// out-of-range advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_threshold_min")]
    pub threshold_min: f64,
    #[serde(default = "default_threshold_max")]
    pub threshold_max: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            scaler_path: default_scaler_path(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            threshold_min: default_threshold_min(),
            threshold_max: default_threshold_max(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_static_dir() -> Option<String> {
    Some("static".to_string())
}

fn default_model_path() -> String {
    "artifacts/lstm_model.json".to_string()
}

fn default_scaler_path() -> String {
    "artifacts/scaler.json".to_string()
}

fn default_window_size() -> usize {
    30
}

fn default_threshold_min() -> f64 {
    84.56
}

fn default_threshold_max() -> f64 {
    11_324_682.73
}
