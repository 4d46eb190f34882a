use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch at {stage}: expected {expected}, got {actual}")]
    Shape {
        stage: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Unknown initializer: {name}")]
    UnknownInitializer { name: String },

    #[error("Prediction unavailable: {0}")]
    PredictionUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn shape(stage: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        Self::Shape {
            stage,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn prediction_unavailable(msg: impl Into<String>) -> Self {
        Self::PredictionUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
