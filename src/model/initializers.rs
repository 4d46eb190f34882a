//! Named weight-construction strategies.
//!
//! A model artifact refers to its initializers by name. The loader resolves
//! every name through an [`InitializerRegistry`] before building any layer,
//! so an artifact that names an unregistered strategy fails at load time.

use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use std::collections::HashMap;
use std::sync::Arc;

pub trait Initializer: Send + Sync {
    /// Build a `(rows, cols)` matrix. Bias vectors are requested as `(1, n)`.
    fn initialize(&self, shape: (usize, usize), rng: &mut StdRng) -> Array2<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Zeros;

impl Initializer for Zeros {
    fn initialize(&self, shape: (usize, usize), _rng: &mut StdRng) -> Array2<f64> {
        Array2::zeros(shape)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ones;

impl Initializer for Ones {
    fn initialize(&self, shape: (usize, usize), _rng: &mut StdRng) -> Array2<f64> {
        Array2::ones(shape)
    }
}

/// Uniform in `[-limit, limit]` with `limit = sqrt(6 / (fan_in + fan_out))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlorotUniform;

impl Initializer for GlorotUniform {
    fn initialize(&self, shape: (usize, usize), rng: &mut StdRng) -> Array2<f64> {
        let (fan_in, fan_out) = shape;
        let limit = (6.0 / (fan_in + fan_out).max(1) as f64).sqrt();
        Array2::from_shape_fn(shape, |_| rng.gen_range(-limit..=limit))
    }
}

/// Orthonormal rows or columns (whichever is shorter), scaled by `gain`.
#[derive(Debug, Clone, Copy)]
pub struct Orthogonal {
    pub gain: f64,
}

impl Default for Orthogonal {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl Initializer for Orthogonal {
    fn initialize(&self, shape: (usize, usize), rng: &mut StdRng) -> Array2<f64> {
        let (rows, cols) = shape;
        let (long, short) = (rows.max(cols), rows.min(cols));

        // Gram-Schmidt over the columns of a tall gaussian matrix.
        let mut q = Array2::<f64>::zeros((long, short));
        for j in 0..short {
            loop {
                let mut v: Vec<f64> = (0..long)
                    .map(|_| rng.sample::<f64, _>(StandardNormal))
                    .collect();
                for k in 0..j {
                    let basis = q.column(k);
                    let dot: f64 = basis.iter().zip(&v).map(|(a, b)| a * b).sum();
                    for (x, b) in v.iter_mut().zip(basis.iter()) {
                        *x -= dot * b;
                    }
                }
                let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm > 1e-10 {
                    for (dst, x) in q.column_mut(j).iter_mut().zip(&v) {
                        *dst = x / norm;
                    }
                    break;
                }
            }
        }

        let q = if rows < cols { q.reversed_axes() } else { q };
        q.as_standard_layout().mapv(|x| x * self.gain)
    }
}

#[derive(Clone)]
pub struct InitializerRegistry {
    entries: HashMap<String, Arc<dyn Initializer>>,
}

impl InitializerRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        initializer: impl Initializer + 'static,
    ) -> &mut Self {
        self.entries.insert(name.into(), Arc::new(initializer));
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Initializer>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownInitializer {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for InitializerRegistry {
    /// Both the class names and the snake_case aliases Keras writes.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("Zeros", Zeros)
            .register("zeros", Zeros)
            .register("Ones", Ones)
            .register("ones", Ones)
            .register("GlorotUniform", GlorotUniform)
            .register("glorot_uniform", GlorotUniform)
            .register("Orthogonal", Orthogonal::default())
            .register("orthogonal", Orthogonal::default());
        registry
    }
}

impl std::fmt::Debug for InitializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn assert_orthonormal_columns(m: &Array2<f64>) {
        let gram = m.t().dot(m);
        for i in 0..gram.nrows() {
            for j in 0..gram.ncols() {
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - want).abs() < 1e-9, "gram[{i},{j}] = {}", gram[[i, j]]);
            }
        }
    }

    #[test]
    fn orthogonal_tall_matrix_has_orthonormal_columns() {
        let m = Orthogonal::default().initialize((12, 4), &mut rng());
        assert_eq!(m.dim(), (12, 4));
        assert_orthonormal_columns(&m);
    }

    #[test]
    fn orthogonal_column_is_normalized_gaussian_draw() {
        let mut draws = rng();
        let v: Vec<f64> = (0..6).map(|_| draws.sample::<f64, _>(StandardNormal)).collect();
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();

        let m = Orthogonal::default().initialize((6, 1), &mut rng());
        for (got, x) in m.iter().zip(&v) {
            assert!((got - x / norm).abs() < 1e-12);
        }
    }

    #[test]
    fn orthogonal_wide_matrix_has_orthonormal_rows() {
        // Recurrent kernels are (units, 4 * units).
        let m = Orthogonal::default().initialize((3, 12), &mut rng());
        assert_eq!(m.dim(), (3, 12));
        assert_orthonormal_columns(&m.t().to_owned());
    }

    #[test]
    fn orthogonal_gain_scales_output() {
        let base = Orthogonal::default().initialize((4, 4), &mut rng());
        let scaled = Orthogonal { gain: 2.0 }.initialize((4, 4), &mut rng());
        for (a, b) in base.iter().zip(scaled.iter()) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn glorot_uniform_stays_within_limit() {
        let m = GlorotUniform.initialize((10, 40), &mut rng());
        let limit = (6.0_f64 / 50.0).sqrt();
        assert!(m.iter().all(|x| x.abs() <= limit));
    }

    #[test]
    fn same_seed_same_weights() {
        let a = GlorotUniform.initialize((5, 5), &mut rng());
        let b = GlorotUniform.initialize((5, 5), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_name_fails_to_resolve() {
        let registry = InitializerRegistry::default();
        assert!(registry.resolve("Orthogonal").is_ok());
        let err = registry.resolve("HeNormal").err().unwrap();
        assert!(matches!(err, Error::UnknownInitializer { name } if name == "HeNormal"));
    }

    #[test]
    fn custom_strategies_can_be_registered() {
        let mut registry = InitializerRegistry::empty();
        assert!(!registry.contains("Orthogonal"));
        registry.register("Orthogonal", Orthogonal { gain: 0.5 });
        assert_eq!(registry.names(), vec!["Orthogonal"]);
    }
}
