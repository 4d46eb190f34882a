mod minmax;

pub use minmax::{MinMaxScaler, ScalerArtifact};

use crate::Result;
use ndarray::Array2;

/// A fitted per-feature transform between real units and model space.
///
/// Inputs are `(samples, features)` arrays; implementations must reject a
/// feature count other than [`Scaler::n_features`].
pub trait Scaler: Send + Sync {
    fn n_features(&self) -> usize;

    fn transform(&self, values: &Array2<f64>) -> Result<Array2<f64>>;

    fn inverse_transform(&self, values: &Array2<f64>) -> Result<Array2<f64>>;
}
