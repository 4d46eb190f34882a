//! Inference-only layers with Keras weight layout.

use crate::{Error, Result};
use ndarray::{Array1, Array2, Array3, Axis, s};
use serde::{Deserialize, Serialize};

/// Activations flowing between layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// `[batch, timesteps, features]`
    Sequence(Array3<f64>),
    /// `[batch, features]`
    Features(Array2<f64>),
}

impl Tensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Sequence(x) => x.shape(),
            Self::Features(x) => x.shape(),
        }
    }

    pub fn into_features(self, stage: &'static str) -> Result<Array2<f64>> {
        match self {
            Self::Features(x) => Ok(x),
            Self::Sequence(x) => Err(Error::shape(
                stage,
                "[batch, features]",
                format!("{:?}", x.shape()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
            Self::Tanh => x.tanh(),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Long short-term memory layer, sigmoid gates and tanh cell activation.
#[derive(Debug, Clone)]
pub struct Lstm {
    units: usize,
    /// `(input_dim, 4 * units)`
    kernel: Array2<f64>,
    /// `(units, 4 * units)`
    recurrent_kernel: Array2<f64>,
    /// `(4 * units,)`
    bias: Array1<f64>,
    return_sequences: bool,
}

impl Lstm {
    pub fn new(
        kernel: Array2<f64>,
        recurrent_kernel: Array2<f64>,
        bias: Array1<f64>,
        return_sequences: bool,
    ) -> Result<Self> {
        let units = recurrent_kernel.nrows();
        if units == 0 {
            return Err(Error::artifact("lstm layer must have at least one unit"));
        }
        let gates = 4 * units;
        if recurrent_kernel.ncols() != gates {
            return Err(Error::artifact(format!(
                "lstm recurrent_kernel must be ({units}, {gates}), got {:?}",
                recurrent_kernel.shape()
            )));
        }
        if kernel.ncols() != gates {
            return Err(Error::artifact(format!(
                "lstm kernel must have {gates} columns, got {:?}",
                kernel.shape()
            )));
        }
        if bias.len() != gates {
            return Err(Error::artifact(format!(
                "lstm bias must have {gates} entries, got {}",
                bias.len()
            )));
        }

        Ok(Self {
            units,
            kernel,
            recurrent_kernel,
            bias,
            return_sequences,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    pub fn return_sequences(&self) -> bool {
        self.return_sequences
    }

    pub fn forward(&self, input: &Array3<f64>) -> Result<Tensor> {
        let (batch, steps, features) = input.dim();
        if features != self.input_dim() {
            return Err(Error::shape(
                "lstm input",
                format!("[_, _, {}]", self.input_dim()),
                format!("{:?}", input.shape()),
            ));
        }

        let u = self.units;
        let mut sequence = self
            .return_sequences
            .then(|| Array3::<f64>::zeros((batch, steps, u)));
        let mut last = Array2::<f64>::zeros((batch, u));

        for b in 0..batch {
            let mut h = Array1::<f64>::zeros(u);
            let mut c = Array1::<f64>::zeros(u);

            for t in 0..steps {
                let x = input.slice(s![b, t, ..]);
                let z = x.dot(&self.kernel) + h.dot(&self.recurrent_kernel) + &self.bias;

                let i = z.slice(s![..u]).mapv(sigmoid);
                let f = z.slice(s![u..2 * u]).mapv(sigmoid);
                let g = z.slice(s![2 * u..3 * u]).mapv(f64::tanh);
                let o = z.slice(s![3 * u..]).mapv(sigmoid);

                c = &f * &c + &i * &g;
                h = &o * &c.mapv(f64::tanh);

                if let Some(out) = sequence.as_mut() {
                    out.slice_mut(s![b, t, ..]).assign(&h);
                }
            }
            last.row_mut(b).assign(&h);
        }

        Ok(match sequence {
            Some(out) => Tensor::Sequence(out),
            None => Tensor::Features(last),
        })
    }
}

/// Fully connected layer. On a sequence it is applied to every timestep.
#[derive(Debug, Clone)]
pub struct Dense {
    /// `(input_dim, units)`
    kernel: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl Dense {
    pub fn new(kernel: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Result<Self> {
        if kernel.ncols() == 0 {
            return Err(Error::artifact("dense layer must have at least one unit"));
        }
        if bias.len() != kernel.ncols() {
            return Err(Error::artifact(format!(
                "dense bias must have {} entries, got {}",
                kernel.ncols(),
                bias.len()
            )));
        }
        Ok(Self {
            kernel,
            bias,
            activation,
        })
    }

    pub fn units(&self) -> usize {
        self.kernel.ncols()
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    fn project(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_dim() {
            return Err(Error::shape(
                "dense input",
                format!("[_, {}]", self.input_dim()),
                format!("{:?}", x.shape()),
            ));
        }
        let activation = self.activation;
        Ok((x.dot(&self.kernel) + &self.bias).mapv(|v| activation.apply(v)))
    }

    pub fn forward(&self, input: Tensor) -> Result<Tensor> {
        match input {
            Tensor::Features(x) => Ok(Tensor::Features(self.project(&x)?)),
            Tensor::Sequence(x) => {
                let (batch, steps, _) = x.dim();
                let mut out = Array3::<f64>::zeros((batch, steps, self.units()));
                for (b, step) in x.axis_iter(Axis(0)).enumerate() {
                    let projected = self.project(&step.to_owned())?;
                    out.index_axis_mut(Axis(0), b).assign(&projected);
                }
                Ok(Tensor::Sequence(out))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    Lstm(Lstm),
    /// Identity at inference time.
    Dropout { rate: f64 },
    Dense(Dense),
}

impl Layer {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lstm(_) => "lstm",
            Self::Dropout { .. } => "dropout",
            Self::Dense(_) => "dense",
        }
    }

    pub fn forward(&self, input: Tensor) -> Result<Tensor> {
        match self {
            Self::Lstm(lstm) => match input {
                Tensor::Sequence(x) => lstm.forward(&x),
                Tensor::Features(x) => Err(Error::shape(
                    "lstm input",
                    "[batch, timesteps, features]",
                    format!("{:?}", x.shape()),
                )),
            },
            Self::Dropout { .. } => Ok(input),
            Self::Dense(dense) => dense.forward(input),
        }
    }
}
