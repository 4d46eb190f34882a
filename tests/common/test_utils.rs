use avocado_forecast::{
    Result,
    config::ArtifactsConfig,
    model::SequenceModel,
    pipeline::{ForecastPipeline, TrainingRange},
    scaler::{MinMaxScaler, ScalerArtifact},
    server::{self, handlers::AppState, types::ModelInfo},
};
use axum::Router;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

pub const TRAIN_MIN: f64 = 84.56;
pub const TRAIN_MAX: f64 = 11_324_682.73;

/// Scaler fitted on the training range
pub fn sales_scaler() -> Arc<MinMaxScaler> {
    Arc::new(
        MinMaxScaler::new(ScalerArtifact {
            data_min: vec![TRAIN_MIN],
            data_max: vec![TRAIN_MAX],
            feature_range: (0.0, 1.0),
        })
        .expect("valid scaler"),
    )
}

/// App state around an injected model and the training-range scaler
pub fn create_test_state(model: impl SequenceModel + 'static) -> AppState {
    let pipeline = ForecastPipeline::new(
        Arc::new(model),
        sales_scaler(),
        TrainingRange::new(TRAIN_MIN, TRAIN_MAX).expect("valid range"),
        30,
    )
    .expect("valid pipeline");

    AppState {
        pipeline: Arc::new(pipeline),
        model: Arc::new(ModelInfo {
            name: "test-model".to_string(),
            loaded_at: Utc::now(),
        }),
    }
}

pub fn create_test_app(model: impl SequenceModel + 'static) -> Router {
    server::router(create_test_state(model), None)
}

pub fn artifact_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("artifacts")
        .join(name)
}

/// The artifacts shipped in the repository
pub fn shipped_artifacts() -> ArtifactsConfig {
    ArtifactsConfig {
        model_path: artifact_path("lstm_model.json").to_string_lossy().to_string(),
        scaler_path: artifact_path("scaler.json").to_string_lossy().to_string(),
    }
}

pub fn flat_window(value: f64) -> Vec<f64> {
    vec![value; 30]
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `content` to `name` inside `dir`
pub async fn create_test_file(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    fs::write(&path, content).await?;
    Ok(path.to_string_lossy().to_string())
}

pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  static_dir: null
  logs:
    level: "debug"

artifacts:
  model_path: "models/lstm.json"
  scaler_path: "models/scaler.json"

pipeline:
  window_size: 30
  threshold_min: 84.56
  threshold_max: 11324682.73
"#;

pub const PARTIAL_CONFIG_YAML: &str = r#"
server:
  port: 8081
"#;

pub const INVERTED_RANGE_CONFIG_YAML: &str = r#"
pipeline:
  threshold_min: 500.0
  threshold_max: 100.0
"#;

pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
"#;
