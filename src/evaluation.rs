//! The evaluation pipeline: dataset to predictions to report artifacts,
//! strictly left to right, each stage consuming the complete output of the
//! previous one.

use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::classifier::{argmax_rows, labels, ClassifierError, ImageClassifier};
use crate::config::EvalConfig;
use crate::dataset::{DatasetError, TestDataset};
use crate::metrics::accuracy;
use crate::report::{write_report, ReportArtifacts, ReportError};
use crate::runtime::RuntimeConfig;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Outcome of a completed evaluation run.
#[derive(Debug)]
pub struct EvalSummary {
    /// Accuracy over the test set, as a percentage
    pub accuracy: f64,
    /// Number of evaluated samples
    pub total: usize,
    /// Number of files skipped because they failed to decode
    pub skipped: usize,
    pub num_classes: usize,
    pub artifacts: ReportArtifacts,
}

/// Runs a full evaluation: loads the model, loads and prepares the test set
/// at the model's input geometry, validates the class order against the
/// label sidecar when one exists, runs one whole-batch predict call, and
/// writes the report artifacts.
pub fn run_evaluation(config: &EvalConfig) -> Result<EvalSummary, EvalError> {
    let start = Instant::now();

    let classifier = ImageClassifier::from_file(&config.model_path, &RuntimeConfig::default())?;
    let (height, width) = classifier.input_size();

    let dataset = TestDataset::load(&config.data_dir, (height, width))?;

    // Fail fast on a class-order mismatch before spending time on inference.
    labels::check_label_order(&config.labels_sidecar(), dataset.class_names())?;
    if let Some(model_classes) = classifier.num_classes() {
        if model_classes != dataset.num_classes() {
            return Err(ClassifierError::ValidationError(format!(
                "model outputs {} classes but the dataset has {}",
                model_classes,
                dataset.num_classes()
            ))
            .into());
        }
    }

    let batch = dataset.to_batch(classifier.layout());
    info!("Prepared batch of shape {:?}", batch.shape());

    let probabilities = classifier.predict_batch(batch)?;
    // Models with a dynamic output shape dodge the pre-flight class-count
    // check, so verify the probability width against the dataset here.
    if probabilities.shape()[1] != dataset.num_classes() {
        return Err(ClassifierError::ValidationError(format!(
            "model returned {} probability columns but the dataset has {} classes",
            probabilities.shape()[1],
            dataset.num_classes()
        ))
        .into());
    }
    let predicted = argmax_rows(&probabilities);

    let accuracy = accuracy(dataset.labels(), &predicted);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let artifacts = write_report(&config.results_dir, &dataset, &predicted, &mut rng)?;

    info!("Evaluation finished in {:.2?}", start.elapsed());
    Ok(EvalSummary {
        accuracy,
        total: dataset.len(),
        skipped: dataset.skipped(),
        num_classes: dataset.num_classes(),
        artifacts,
    })
}
