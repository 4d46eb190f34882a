//! Window in real units -> next value in real units.
//!
//! Stage shapes: `(n,)` -> `(n, 1)` scaled -> `[1, n, 1]` -> model `(1, 1)`
//! -> clipped -> `(1, 1)` real units -> scalar.

mod types;

pub use types::*;

use crate::model::SequenceModel;
use crate::scaler::Scaler;
use crate::{Error, Result};
use ndarray::{Array2, Array3};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ForecastPipeline {
    model: Arc<dyn SequenceModel>,
    scaler: Arc<dyn Scaler>,
    range: TrainingRange,
    window_size: usize,
}

impl ForecastPipeline {
    pub fn new(
        model: Arc<dyn SequenceModel>,
        scaler: Arc<dyn Scaler>,
        range: TrainingRange,
        window_size: usize,
    ) -> Result<Self> {
        if model.input_shape() != (window_size, 1) {
            return Err(Error::config(format!(
                "model expects input {:?} but the pipeline window is ({window_size}, 1)",
                model.input_shape()
            )));
        }
        if scaler.n_features() != 1 {
            return Err(Error::config(format!(
                "scaler is fitted on {} features, expected 1",
                scaler.n_features()
            )));
        }

        Ok(Self {
            model,
            scaler,
            range,
            window_size,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn training_range(&self) -> TrainingRange {
        self.range
    }

    pub fn predict(&self, window: &InputWindow) -> Result<PredictionResult> {
        let n = self.window_size;
        if window.len() != n {
            return Err(Error::invalid_input(format!(
                "invalid input length: expected exactly {n} values, got {}",
                window.len()
            )));
        }

        let warning = if self.range.covers(window) {
            None
        } else {
            debug!(
                window_min = window.min(),
                window_max = window.max(),
                "Input window outside training range"
            );
            Some(OUT_OF_RANGE_WARNING.to_string())
        };

        let column = Array2::from_shape_vec((n, 1), window.values().to_vec())
            .map_err(|e| Error::internal(e.to_string()))?;
        let scaled = self.scaler.transform(&column)?;
        expect_shape("normalized window", scaled.shape(), &[n, 1])?;

        let batch = Array3::from_shape_vec((1, n, 1), scaled.iter().copied().collect())
            .map_err(|e| Error::internal(e.to_string()))?;

        let raw = self.model.predict(&batch)?;
        expect_shape("model output", raw.shape(), &[1, 1])?;

        let raw_value = raw[[0, 0]];
        if !raw_value.is_finite() {
            warn!(raw = raw_value, "Model produced a non-finite output");
            return Err(Error::prediction_unavailable(
                "model produced a non-finite output",
            ));
        }

        let clipped = raw.mapv(|v| v.clamp(0.0, 1.0));
        let restored = self.scaler.inverse_transform(&clipped)?;
        expect_shape("denormalized output", restored.shape(), &[1, 1])?;

        let value = restored[[0, 0]];
        if !value.is_finite() {
            warn!(value, "Denormalized prediction is not finite");
            return Err(Error::prediction_unavailable(
                "denormalized prediction is not finite",
            ));
        }

        debug!(raw = raw_value, value, "Prediction computed");
        Ok(PredictionResult { value, warning })
    }
}

fn expect_shape(stage: &'static str, actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual != expected {
        return Err(Error::shape(
            stage,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ));
    }
    Ok(())
}
