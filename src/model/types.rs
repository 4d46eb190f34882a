use super::layers::Activation;
use serde::{Deserialize, Serialize};

/// JSON form of a sequential model: architecture, named initializers and
/// (optionally) trained weights in Keras layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_model_name")]
    pub name: String,
    /// `(timesteps, features)`
    pub input_shape: (usize, usize),
    /// Seeds initializers for layers that ship without weights.
    #[serde(default)]
    pub seed: u64,
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Lstm(LstmSpec),
    Dropout(DropoutSpec),
    Dense(DenseSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmSpec {
    pub units: usize,
    #[serde(default)]
    pub return_sequences: bool,
    #[serde(default = "default_kernel_initializer")]
    pub kernel_initializer: String,
    #[serde(default = "default_recurrent_initializer")]
    pub recurrent_initializer: String,
    #[serde(default = "default_bias_initializer")]
    pub bias_initializer: String,
    #[serde(default = "default_true")]
    pub unit_forget_bias: bool,
    #[serde(default)]
    pub weights: Option<LstmWeights>,
}

/// Gate order along the `4 * units` axis is `i, f, c, o`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmWeights {
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropoutSpec {
    #[serde(default)]
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseSpec {
    pub units: usize,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default = "default_kernel_initializer")]
    pub kernel_initializer: String,
    #[serde(default = "default_bias_initializer")]
    pub bias_initializer: String,
    #[serde(default)]
    pub weights: Option<DenseWeights>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseWeights {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LayerSpec {
    /// Every initializer name this layer refers to.
    pub fn initializer_names(&self) -> Vec<&str> {
        match self {
            Self::Lstm(spec) => vec![
                spec.kernel_initializer.as_str(),
                spec.recurrent_initializer.as_str(),
                spec.bias_initializer.as_str(),
            ],
            Self::Dense(spec) => vec![
                spec.kernel_initializer.as_str(),
                spec.bias_initializer.as_str(),
            ],
            Self::Dropout(_) => Vec::new(),
        }
    }
}

fn default_model_name() -> String {
    "sequential".to_string()
}

fn default_kernel_initializer() -> String {
    "GlorotUniform".to_string()
}

fn default_recurrent_initializer() -> String {
    "Orthogonal".to_string()
}

fn default_bias_initializer() -> String {
    "Zeros".to_string()
}

fn default_true() -> bool {
    true
}
