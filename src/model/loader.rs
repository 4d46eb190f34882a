use super::initializers::InitializerRegistry;
use super::layers::{Dense, Layer, Lstm, Tensor};
use super::types::{DenseSpec, LayerSpec, LstmSpec, ModelArtifact};
use super::SequenceModel;
use crate::{Error, Result};
use ndarray::{Array1, Array2, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{debug, info};

/// A stack of layers run in order over a `[batch, timesteps, features]` input.
#[derive(Debug, Clone)]
pub struct SequentialModel {
    name: String,
    input_shape: (usize, usize),
    layers: Vec<Layer>,
}

impl SequentialModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

impl SequenceModel for SequentialModel {
    fn input_shape(&self) -> (usize, usize) {
        self.input_shape
    }

    fn predict(&self, input: &Array3<f64>) -> Result<Array2<f64>> {
        let (_, steps, features) = input.dim();
        if (steps, features) != self.input_shape {
            return Err(Error::shape(
                "model input",
                format!("[_, {}, {}]", self.input_shape.0, self.input_shape.1),
                format!("{:?}", input.shape()),
            ));
        }

        let mut x = Tensor::Sequence(input.to_owned());
        for layer in &self.layers {
            x = layer.forward(x)?;
        }
        x.into_features("model output")
    }
}

/// Builds a [`SequentialModel`] from its JSON artifact, resolving every
/// named initializer through the registry it was given.
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    registry: InitializerRegistry,
}

impl ModelLoader {
    pub fn new(registry: InitializerRegistry) -> Self {
        Self { registry }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<SequentialModel> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read model {}: {e}", path.display()))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        let model = self.build(artifact)?;

        info!(
            path = %path.display(),
            name = model.name(),
            layers = model.layers().len(),
            "Loaded sequence model"
        );
        Ok(model)
    }

    pub fn build(&self, artifact: ModelArtifact) -> Result<SequentialModel> {
        let ModelArtifact {
            name,
            input_shape,
            seed,
            layers: specs,
        } = artifact;

        if input_shape.0 == 0 || input_shape.1 == 0 {
            return Err(Error::artifact(format!(
                "model input_shape must be non-empty, got {input_shape:?}"
            )));
        }
        if specs.is_empty() {
            return Err(Error::artifact("model has no layers"));
        }

        // Resolve every name up front so a missing strategy fails the whole load.
        for spec in &specs {
            for initializer in spec.initializer_names() {
                self.registry.resolve(initializer)?;
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut is_sequence = true;
        let mut dim = input_shape.1;
        let mut layers = Vec::with_capacity(specs.len());

        for (index, spec) in specs.into_iter().enumerate() {
            let layer = match spec {
                LayerSpec::Lstm(spec) => {
                    if !is_sequence {
                        return Err(Error::artifact(format!(
                            "layer {index} (lstm) needs a sequence input but receives a flat one"
                        )));
                    }
                    let lstm = self.build_lstm(index, &spec, dim, &mut rng)?;
                    is_sequence = lstm.return_sequences();
                    dim = lstm.units();
                    Layer::Lstm(lstm)
                }
                LayerSpec::Dropout(spec) => {
                    if !(0.0..1.0).contains(&spec.rate) {
                        return Err(Error::artifact(format!(
                            "layer {index} (dropout) rate must be in [0, 1), got {}",
                            spec.rate
                        )));
                    }
                    Layer::Dropout { rate: spec.rate }
                }
                LayerSpec::Dense(spec) => {
                    let dense = self.build_dense(index, &spec, dim, &mut rng)?;
                    dim = dense.units();
                    Layer::Dense(dense)
                }
            };
            debug!(index, kind = layer.kind(), output_dim = dim, "Built layer");
            layers.push(layer);
        }

        if is_sequence {
            return Err(Error::artifact(
                "model output is still a sequence; the last recurrent layer must not return sequences",
            ));
        }

        Ok(SequentialModel {
            name,
            input_shape,
            layers,
        })
    }

    fn build_lstm(
        &self,
        index: usize,
        spec: &LstmSpec,
        input_dim: usize,
        rng: &mut StdRng,
    ) -> Result<Lstm> {
        let units = spec.units;
        if units == 0 {
            return Err(Error::artifact(format!("layer {index} (lstm) has zero units")));
        }
        let gates = 4 * units;

        let (kernel, recurrent_kernel, bias) = match &spec.weights {
            Some(weights) => (
                matrix(index, "kernel", &weights.kernel, (input_dim, gates))?,
                matrix(index, "recurrent_kernel", &weights.recurrent_kernel, (units, gates))?,
                vector(index, "bias", &weights.bias, gates)?,
            ),
            None => {
                let kernel = self
                    .registry
                    .resolve(&spec.kernel_initializer)?
                    .initialize((input_dim, gates), rng);
                let recurrent_kernel = self
                    .registry
                    .resolve(&spec.recurrent_initializer)?
                    .initialize((units, gates), rng);
                let mut bias = self
                    .registry
                    .resolve(&spec.bias_initializer)?
                    .initialize((1, gates), rng)
                    .row(0)
                    .to_owned();
                if spec.unit_forget_bias {
                    bias.slice_mut(ndarray::s![units..2 * units])
                        .mapv_inplace(|b| b + 1.0);
                }
                (kernel, recurrent_kernel, bias)
            }
        };

        Lstm::new(kernel, recurrent_kernel, bias, spec.return_sequences)
    }

    fn build_dense(
        &self,
        index: usize,
        spec: &DenseSpec,
        input_dim: usize,
        rng: &mut StdRng,
    ) -> Result<Dense> {
        let units = spec.units;
        if units == 0 {
            return Err(Error::artifact(format!("layer {index} (dense) has zero units")));
        }

        let (kernel, bias) = match &spec.weights {
            Some(weights) => (
                matrix(index, "kernel", &weights.kernel, (input_dim, units))?,
                vector(index, "bias", &weights.bias, units)?,
            ),
            None => (
                self.registry
                    .resolve(&spec.kernel_initializer)?
                    .initialize((input_dim, units), rng),
                self.registry
                    .resolve(&spec.bias_initializer)?
                    .initialize((1, units), rng)
                    .row(0)
                    .to_owned(),
            ),
        };

        Dense::new(kernel, bias, spec.activation)
    }
}

fn matrix(
    index: usize,
    field: &str,
    rows: &[Vec<f64>],
    expected: (usize, usize),
) -> Result<Array2<f64>> {
    let actual_cols = rows.first().map_or(0, Vec::len);
    if rows.len() != expected.0 || rows.iter().any(|row| row.len() != expected.1) {
        return Err(Error::artifact(format!(
            "layer {index} {field} must be {expected:?}, got ({}, {actual_cols})",
            rows.len()
        )));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Error::artifact(format!(
            "layer {index} {field} contains non-finite weights"
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec(expected, flat).map_err(|e| Error::internal(e.to_string()))
}

fn vector(index: usize, field: &str, values: &[f64], expected: usize) -> Result<Array1<f64>> {
    if values.len() != expected {
        return Err(Error::artifact(format!(
            "layer {index} {field} must have {expected} entries, got {}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::artifact(format!(
            "layer {index} {field} contains non-finite weights"
        )));
    }
    Ok(Array1::from(values.to_vec()))
}
