use super::types::{ErrorResponse, HealthResponse, ModelInfo, PredictRequest, PredictResponse};
use crate::{
    Error,
    pipeline::{ForecastPipeline, InputWindow},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ForecastPipeline>,
    pub model: Arc<ModelInfo>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &Error) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    info!(
        "Received prediction request with {} values",
        request.last_30_values.len()
    );

    let window = InputWindow::new(request.last_30_values, state.pipeline.window_size())
        .map_err(|e| {
            warn!("Rejected prediction request: {}", e);
            api_error(&e)
        })?;

    match state.pipeline.predict(&window) {
        Ok(result) => {
            info!(
                predicted = result.value,
                out_of_range = result.warning.is_some(),
                "Prediction served"
            );
            Ok(Json(PredictResponse {
                predicted_total_volume: result.value,
                warning: result.warning,
            }))
        }
        Err(e) => {
            error!("Failed to compute prediction: {}", e);
            Err(api_error(&e))
        }
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model.name.clone(),
        window_size: state.pipeline.window_size(),
        loaded_at: state.model.loaded_at,
    })
}
