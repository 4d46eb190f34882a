//! Min-max scaling fitted offline and loaded read-only.

use super::Scaler;
use crate::{Error, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk form of a fitted min-max scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// `x' = x * scale + min` where `scale = (hi - lo) / (data_max - data_min)`.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    data_min: Array1<f64>,
    data_max: Array1<f64>,
    scale: Array1<f64>,
    min: Array1<f64>,
}

impl MinMaxScaler {
    pub fn new(artifact: ScalerArtifact) -> Result<Self> {
        let ScalerArtifact {
            data_min,
            data_max,
            feature_range: (lo, hi),
        } = artifact;

        if data_min.is_empty() {
            return Err(Error::artifact("scaler has no fitted features"));
        }
        if data_min.len() != data_max.len() {
            return Err(Error::artifact(format!(
                "scaler data_min has {} features but data_max has {}",
                data_min.len(),
                data_max.len()
            )));
        }
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(Error::artifact(format!(
                "invalid scaler feature_range ({lo}, {hi})"
            )));
        }

        let data_min = Array1::from(data_min);
        let data_max = Array1::from(data_max);
        for (i, (&min, &max)) in data_min.iter().zip(data_max.iter()).enumerate() {
            if !(min.is_finite() && max.is_finite()) {
                return Err(Error::artifact(format!(
                    "scaler feature {i} has non-finite bounds"
                )));
            }
            if max < min {
                return Err(Error::artifact(format!(
                    "scaler feature {i} has data_max {max} below data_min {min}"
                )));
            }
        }

        // A constant feature maps onto `lo`, same as scikit-learn.
        let data_range = (&data_max - &data_min).mapv(|r| if r == 0.0 { 1.0 } else { r });
        let scale = data_range.mapv(|r| (hi - lo) / r);
        let min = lo - &data_min * &scale;

        Ok(Self {
            data_min,
            data_max,
            scale,
            min,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read scaler {}: {e}", path.display()))
        })?;
        let artifact: ScalerArtifact = serde_json::from_str(&content)?;
        let scaler = Self::new(artifact)?;

        info!(
            path = %path.display(),
            features = scaler.n_features(),
            "Loaded min-max scaler"
        );
        Ok(scaler)
    }

    pub fn data_min(&self) -> &Array1<f64> {
        &self.data_min
    }

    pub fn data_max(&self) -> &Array1<f64> {
        &self.data_max
    }

    fn check_features(&self, stage: &'static str, values: &Array2<f64>) -> Result<()> {
        if values.ncols() != self.n_features() {
            return Err(Error::shape(
                stage,
                format!("(_, {})", self.n_features()),
                format!("{:?}", values.shape()),
            ));
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.scale.len()
    }

    fn transform(&self, values: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_features("scaler transform", values)?;
        Ok(values * &self.scale + &self.min)
    }

    fn inverse_transform(&self, values: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_features("scaler inverse transform", values)?;
        Ok((values - &self.min) / &self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    const TRAIN_MIN: f64 = 84.56;
    const TRAIN_MAX: f64 = 11_324_682.73;

    fn sales_scaler() -> MinMaxScaler {
        MinMaxScaler::new(ScalerArtifact {
            data_min: vec![TRAIN_MIN],
            data_max: vec![TRAIN_MAX],
            feature_range: (0.0, 1.0),
        })
        .unwrap()
    }

    #[test]
    fn bounds_map_to_unit_interval() {
        let scaler = sales_scaler();
        let scaled = scaler.transform(&array![[TRAIN_MIN], [TRAIN_MAX]]).unwrap();
        assert!((scaled[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((scaled[[1, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn round_trip_within_fitted_range() {
        let scaler = sales_scaler();
        let values = array![[84.56], [1_000.0], [20_000.0], [523_411.9], [11_324_682.73]];
        let restored = scaler
            .inverse_transform(&scaler.transform(&values).unwrap())
            .unwrap();
        for (a, b) in values.iter().zip(restored.iter()) {
            assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0), "{a} vs {b}");
        }
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let scaler = sales_scaler();
        let scaled = scaler.transform(&array![[10.0], [2.0 * TRAIN_MAX]]).unwrap();
        assert!(scaled[[0, 0]] < 0.0);
        assert!(scaled[[1, 0]] > 1.0);
    }

    #[test]
    fn custom_feature_range() {
        let scaler = MinMaxScaler::new(ScalerArtifact {
            data_min: vec![0.0],
            data_max: vec![10.0],
            feature_range: (-1.0, 1.0),
        })
        .unwrap();
        let scaled = scaler.transform(&array![[0.0], [5.0], [10.0]]).unwrap();
        for (got, want) in scaled.iter().zip([-1.0, 0.0, 1.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_feature_maps_to_lower_bound() {
        let scaler = MinMaxScaler::new(ScalerArtifact {
            data_min: vec![7.0],
            data_max: vec![7.0],
            feature_range: (0.0, 1.0),
        })
        .unwrap();
        let scaled = scaler.transform(&array![[7.0]]).unwrap();
        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaler.inverse_transform(&scaled).unwrap()[[0, 0]], 7.0);
    }

    #[test]
    fn feature_count_mismatch_is_shape_error() {
        let scaler = sales_scaler();
        let err = scaler.transform(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn mismatched_bounds_are_rejected() {
        let err = MinMaxScaler::new(ScalerArtifact {
            data_min: vec![0.0, 1.0],
            data_max: vec![1.0],
            feature_range: (0.0, 1.0),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));

        let err = MinMaxScaler::new(ScalerArtifact {
            data_min: vec![5.0],
            data_max: vec![1.0],
            feature_range: (0.0, 1.0),
        })
        .unwrap_err();
        assert!(err.to_string().contains("below data_min"));
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"data_min": [84.56], "data_max": [11324682.73]}}"#).unwrap();

        let scaler = MinMaxScaler::from_file(file.path()).unwrap();
        assert_eq!(scaler.n_features(), 1);
        assert_eq!(scaler.data_min()[0], TRAIN_MIN);
        assert_eq!(scaler.data_max()[0], TRAIN_MAX);
    }

    #[test]
    fn missing_file_is_artifact_error() {
        let err = MinMaxScaler::from_file("/nonexistent/scaler.json").unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }
}
