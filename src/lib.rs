//! Batch evaluation for ONNX image classifiers.
//!
//! Given a test directory laid out as one subdirectory per class and a
//! trained ONNX model, `occipital` decodes and resizes every readable image
//! to the model's expected input geometry, runs a single whole-batch
//! predict call, and writes an evaluation report to disk: overall accuracy,
//! a confusion-matrix heatmap, an sklearn-style classification report, and
//! a grid of sampled predictions colored by correctness.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use occipital::{run_evaluation, EvalConfig};
//!
//! let config = EvalConfig::new("data/TEST", "models/classifier.onnx", "results");
//! let summary = run_evaluation(&config)?;
//! println!("Test Data Accuracy: {:.2}", summary.accuracy);
//! # Ok(())
//! # }
//! ```
//!
//! Label indices are assigned by sorting class directory names
//! lexicographically; that order must match the one used at training time.
//! A JSON sidecar next to the model (`<model_stem>.labels.json`) makes the
//! trained order explicit and is validated before inference when present —
//! see [`classifier::labels`].

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod evaluation;
pub mod metrics;
pub mod report;
mod runtime;

pub use classifier::{argmax_rows, ClassifierError, ClassifierInfo, ImageClassifier, InputLayout, LabelMap};
pub use config::EvalConfig;
pub use dataset::{DatasetError, TestDataset};
pub use evaluation::{run_evaluation, EvalError, EvalSummary};
pub use metrics::{accuracy, classification_report, ConfusionMatrix, MetricsError};
pub use report::{ReportArtifacts, ReportError};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
