pub mod initializers;
pub mod layers;
mod loader;
mod types;

pub use initializers::{Initializer, InitializerRegistry};
pub use layers::{Activation, Dense, Layer, Lstm, Tensor};
pub use loader::{ModelLoader, SequentialModel};
pub use types::*;

use crate::Result;
use ndarray::{Array2, Array3};

/// A trained regressor over fixed-length windows.
///
/// `predict` takes `[batch, timesteps, features]` and returns
/// `[batch, outputs]` in normalized space. Implementations must be pure:
/// the same input always yields the same output.
pub trait SequenceModel: Send + Sync {
    /// `(timesteps, features)` expected per batch item.
    fn input_shape(&self) -> (usize, usize);

    fn predict(&self, input: &Array3<f64>) -> Result<Array2<f64>>;
}
