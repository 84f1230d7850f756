//! Evaluation run configuration.
//!
//! Every path the pipeline touches is carried here explicitly rather than
//! derived from the running binary's location, and the sampling seed is part
//! of the configuration so repeated runs select the same prediction-grid
//! samples.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::LabelMap;

/// File name of the confusion-matrix heatmap inside the results directory.
pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.png";
/// File name of the plain-text classification report.
pub const CLASSIFICATION_REPORT_FILE: &str = "classification_report.txt";
/// File name of the sampled-predictions grid image.
pub const SAMPLE_PREDICTIONS_FILE: &str = "test_predictions_sample.png";

pub const DEFAULT_SEED: u64 = 42;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// All inputs and outputs of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Root of the labeled test set, one subdirectory per class
    pub data_dir: PathBuf,
    /// Path to the ONNX model artifact
    pub model_path: PathBuf,
    /// Optional explicit label-mapping sidecar; defaults to
    /// `<model_stem>.labels.json` next to the model
    #[serde(default)]
    pub labels_path: Option<PathBuf>,
    /// Directory the report artifacts are written into (created if absent)
    pub results_dir: PathBuf,
    /// Seed for the prediction-grid sampler
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl EvalConfig {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_path: model_path.into(),
            labels_path: None,
            results_dir: results_dir.into(),
            seed: DEFAULT_SEED,
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, std::io::Error> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(std::io::Error::other)
    }

    /// The label-mapping sidecar in effect for this run.
    pub fn labels_sidecar(&self) -> PathBuf {
        self.labels_path
            .clone()
            .unwrap_or_else(|| LabelMap::sidecar_path(&self.model_path))
    }

    pub fn confusion_matrix_path(&self) -> PathBuf {
        self.results_dir.join(CONFUSION_MATRIX_FILE)
    }

    pub fn classification_report_path(&self) -> PathBuf {
        self.results_dir.join(CLASSIFICATION_REPORT_FILE)
    }

    pub fn sample_predictions_path(&self) -> PathBuf {
        self.results_dir.join(SAMPLE_PREDICTIONS_FILE)
    }
}
