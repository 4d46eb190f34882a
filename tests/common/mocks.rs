use avocado_forecast::{Result, model::SequenceModel};
use mockall::mock;
use ndarray::{Array2, Array3};

// Mock sequence model for asserting how the pipeline calls inference
mock! {
    pub Model {}

    impl SequenceModel for Model {
        fn input_shape(&self) -> (usize, usize);
        fn predict(&self, input: &Array3<f64>) -> Result<Array2<f64>>;
    }
}

impl MockModel {
    /// A 30-step model that answers `output` in normalized space.
    pub fn answering(output: f64) -> Self {
        let mut model = MockModel::new();
        model.expect_input_shape().return_const((30usize, 1usize));
        model
            .expect_predict()
            .returning(move |_| Ok(Array2::from_elem((1, 1), output)));
        model
    }

    /// A 30-step model that must never be asked for a prediction.
    pub fn untouched() -> Self {
        let mut model = MockModel::new();
        model.expect_input_shape().return_const((30usize, 1usize));
        model.expect_predict().never();
        model
    }
}

/// Predicts the mean of the normalized window, so in-range flat windows
/// come back as themselves.
#[derive(Debug, Default)]
pub struct MeanModel;

impl SequenceModel for MeanModel {
    fn input_shape(&self) -> (usize, usize) {
        (30, 1)
    }

    fn predict(&self, input: &Array3<f64>) -> Result<Array2<f64>> {
        Ok(Array2::from_elem((1, 1), input.mean().unwrap_or(0.0)))
    }
}
