//! Report generation: metric artifacts written to the results directory.
//!
//! Three artifacts per run, at fixed names inside the results directory:
//! the confusion-matrix heatmap, the plain-text classification report, and
//! the sampled-predictions grid. Existing files are overwritten silently.

pub mod render;
mod sample;

pub use sample::sample_indices;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rand::Rng;
use thiserror::Error;

use crate::config::{
    CLASSIFICATION_REPORT_FILE, CONFUSION_MATRIX_FILE, SAMPLE_PREDICTIONS_FILE,
};
use crate::dataset::TestDataset;
use crate::metrics::{classification_report, ConfusionMatrix, MetricsError};

/// Number of tiles in the sampled-predictions grid (5x5).
pub const SAMPLE_GRID_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Paths of the artifacts written by one run.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub confusion_matrix: PathBuf,
    pub classification_report: PathBuf,
    pub sample_predictions: PathBuf,
}

/// Writes all three report artifacts for an evaluated run.
///
/// `predicted` must be index-aligned with the dataset's labels. The rng
/// drives sample selection for the prediction grid and is injected so the
/// caller controls reproducibility. Any write failure is fatal.
pub fn write_report<R: Rng + ?Sized>(
    results_dir: &Path,
    dataset: &TestDataset,
    predicted: &[usize],
    rng: &mut R,
) -> Result<ReportArtifacts, ReportError> {
    fs::create_dir_all(results_dir)?;

    let cm = ConfusionMatrix::from_labels(dataset.num_classes(), dataset.labels(), predicted)?;

    let heatmap = render::render_confusion_matrix(&cm, dataset.class_names());
    let confusion_matrix_path = results_dir.join(CONFUSION_MATRIX_FILE);
    heatmap.save(&confusion_matrix_path)?;
    println!("Confusion matrix saved to: {}", confusion_matrix_path.display());

    let mut text = String::from("Classification Report:\n");
    text.push_str(&classification_report(&cm, dataset.class_names()));
    let report_path = results_dir.join(CLASSIFICATION_REPORT_FILE);
    fs::write(&report_path, text)?;
    println!("Classification report saved to: {}", report_path.display());

    let indices = sample_indices(rng, dataset.len(), SAMPLE_GRID_SIZE);
    info!("Rendering {} sampled predictions", indices.len());
    let grid = render::render_sample_grid(
        dataset.images(),
        dataset.labels(),
        predicted,
        dataset.class_names(),
        &indices,
    );
    let grid_path = results_dir.join(SAMPLE_PREDICTIONS_FILE);
    grid.save(&grid_path)?;
    println!("Sample test predictions saved to: {}", grid_path.display());

    Ok(ReportArtifacts {
        confusion_matrix: confusion_matrix_path,
        classification_report: report_path,
        sample_predictions: grid_path,
    })
}
