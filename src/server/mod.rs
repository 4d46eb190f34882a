pub mod handlers;
pub mod types;

use crate::{
    Result,
    config::{ArtifactsConfig, Config, PipelineConfig},
    model::{ModelLoader, SequenceModel},
    pipeline::{ForecastPipeline, TrainingRange},
    scaler::MinMaxScaler,
};
use axum::{
    Router,
    routing::{get, post},
};
use chrono::Utc;
use handlers::AppState;
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use types::ModelInfo;

/// Load both artifacts and wire them into a pipeline. Any failure here is
/// fatal for the process.
pub fn build_state(artifacts: &ArtifactsConfig, pipeline: &PipelineConfig) -> Result<AppState> {
    let model = ModelLoader::default().load(&artifacts.model_path)?;
    let scaler = MinMaxScaler::from_file(&artifacts.scaler_path)?;

    let info = ModelInfo {
        name: model.name().to_string(),
        loaded_at: Utc::now(),
    };
    let model: Arc<dyn SequenceModel> = Arc::new(model);

    let pipeline = ForecastPipeline::new(
        model,
        Arc::new(scaler),
        TrainingRange::try_from(pipeline)?,
        pipeline.window_size,
    )?;

    Ok(AppState {
        pipeline: Arc::new(pipeline),
        model: Arc::new(info),
    })
}

pub fn router(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    if let Some(dir) = static_dir {
        if dir.is_dir() {
            app = app.nest_service("/static", ServeDir::new(dir));
        } else {
            warn!("Static directory {} not found, skipping", dir.display());
        }
    }

    app.layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<()> {
    let mut artifacts = config.artifacts.clone();
    if let Ok(path) = std::env::var("MODEL_PATH") {
        artifacts.model_path = path;
    }
    if let Ok(path) = std::env::var("SCALER_PATH") {
        artifacts.scaler_path = path;
    }

    let app_state = build_state(&artifacts, &config.pipeline)?;
    info!(
        "Forecast pipeline ready (model: {}, window: {})",
        app_state.model.name,
        app_state.pipeline.window_size()
    );

    let app = router(app_state, config.server.static_dir.as_deref().map(Path::new));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
