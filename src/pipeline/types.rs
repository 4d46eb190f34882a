use crate::config::PipelineConfig;
use crate::{Error, Result};
use serde::Serialize;

pub const OUT_OF_RANGE_WARNING: &str = "Warning: These values may be out of training range.";

/// The most recent observations, oldest first.
///
/// Only constructible through [`InputWindow::new`], which guarantees the
/// expected length and finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct InputWindow {
    values: Vec<f64>,
}

impl InputWindow {
    pub fn new(values: Vec<f64>, expected_len: usize) -> Result<Self> {
        if values.len() != expected_len {
            return Err(Error::invalid_input(format!(
                "invalid input length: expected exactly {expected_len} values, got {}",
                values.len()
            )));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::invalid_input(format!(
                "value at position {position} is not a finite number"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Bounds of the data the model and scaler were fitted on. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRange {
    pub min: f64,
    pub max: f64,
}

impl TrainingRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(Error::config(format!(
                "training range must satisfy min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn covers(&self, window: &InputWindow) -> bool {
        window.min() >= self.min && window.max() <= self.max
    }
}

impl TryFrom<&PipelineConfig> for TrainingRange {
    type Error = Error;

    fn try_from(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.threshold_min, config.threshold_max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub value: f64,
    pub warning: Option<String>,
}
