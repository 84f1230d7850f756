use ort::Error as OrtError;
use thiserror::Error;

/// Represents the different types of errors that can occur while loading or
/// running an image classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Error occurred while loading or inspecting the ONNX model
    #[error("Model error: {0}")]
    ModelError(String),
    /// Error occurred while running batch inference
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Error occurred while reading or parsing the label mapping sidecar
    #[error("Label mapping error: {0}")]
    LabelError(String),
    /// The persisted class order does not match the dataset's class order
    #[error("Label mapping mismatch: {0}")]
    LabelMismatch(String),
    /// IO error while reading model or sidecar files
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::ModelError(err.to_string())
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::LabelError(err.to_string())
    }
}
