//! Persisted class-name-to-index mapping.
//!
//! Label indices are derived from the lexicographic order of the test
//! directory's class subdirectories. That order must agree with the order
//! used when the model was trained, which nothing in the model artifact
//! records. A small JSON sidecar written next to the model
//! (`<model_stem>.labels.json`) closes that gap: when present it is checked
//! against the dataset's class listing before any inference runs, and a
//! mismatch aborts the evaluation.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// The class order a model was trained with, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap {
    pub classes: Vec<String>,
}

impl LabelMap {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Returns the conventional sidecar path for a model file, e.g.
    /// `models/disease.onnx` -> `models/disease.labels.json`.
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("labels.json")
    }

    /// Loads a label map from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let bytes = fs::read(path)?;
        let map: LabelMap = serde_json::from_slice(&bytes)?;
        if map.classes.is_empty() {
            return Err(ClassifierError::LabelError(format!(
                "Label mapping at {} contains no classes",
                path.display()
            )));
        }
        Ok(map)
    }

    /// Writes the label map as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ClassifierError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Checks that `dataset_classes` matches this map exactly, in order.
    pub fn validate(&self, dataset_classes: &[String]) -> Result<(), ClassifierError> {
        if self.classes.len() != dataset_classes.len() {
            return Err(ClassifierError::LabelMismatch(format!(
                "model was trained on {} classes but the dataset has {}",
                self.classes.len(),
                dataset_classes.len()
            )));
        }
        for (idx, (trained, found)) in self.classes.iter().zip(dataset_classes).enumerate() {
            if trained != found {
                return Err(ClassifierError::LabelMismatch(format!(
                    "class index {} is '{}' in the label mapping but '{}' in the dataset",
                    idx, trained, found
                )));
            }
        }
        Ok(())
    }
}

/// Validates the dataset's class order against the sidecar at `sidecar`,
/// when one exists. A missing sidecar is not an error: the run falls back to
/// assuming training used the same sorted directory order.
pub fn check_label_order(
    sidecar: &Path,
    dataset_classes: &[String],
) -> Result<(), ClassifierError> {
    if !sidecar.exists() {
        warn!(
            "No label mapping found at {}; assuming training used the same sorted class order",
            sidecar.display()
        );
        return Ok(());
    }
    let map = LabelMap::load(sidecar)?;
    map.validate(dataset_classes)?;
    info!(
        "Label mapping validated: {} classes match the dataset order",
        map.classes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sidecar_path() {
        let path = LabelMap::sidecar_path(Path::new("models/disease.onnx"));
        assert_eq!(path, PathBuf::from("models/disease.labels.json"));
    }

    #[test]
    fn test_validate_matching_order() {
        let map = LabelMap::new(classes(&["calculus", "caries", "gingivitis"]));
        assert!(map.validate(&classes(&["calculus", "caries", "gingivitis"])).is_ok());
    }

    #[test]
    fn test_validate_rejects_reordered_classes() {
        let map = LabelMap::new(classes(&["caries", "calculus"]));
        let result = map.validate(&classes(&["calculus", "caries"]));
        assert!(matches!(result, Err(ClassifierError::LabelMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_count_mismatch() {
        let map = LabelMap::new(classes(&["a", "b", "c"]));
        let result = map.validate(&classes(&["a", "b"]));
        assert!(matches!(result, Err(ClassifierError::LabelMismatch(_))));
    }

    #[test]
    fn test_missing_sidecar_is_not_fatal() {
        let result = check_label_order(
            Path::new("/tmp/occipital-no-such-sidecar.labels.json"),
            &classes(&["a", "b"]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_round_trip_and_check() {
        let dir = std::env::temp_dir().join("occipital-labels-test");
        std::fs::create_dir_all(&dir).unwrap();
        let sidecar = dir.join("model.labels.json");

        let map = LabelMap::new(classes(&["cat", "dog"]));
        map.save(&sidecar).unwrap();

        assert!(check_label_order(&sidecar, &classes(&["cat", "dog"])).is_ok());
        assert!(check_label_order(&sidecar, &classes(&["dog", "cat"])).is_err());
    }
}
