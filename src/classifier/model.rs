use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::info;
use ndarray::{Array2, Array4, ArrayView1, Ix2};
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::ClassifierInfo;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Axis order the model expects for image batches.
///
/// Keras-exported models are typically channels-last (`[N, H, W, 3]`);
/// PyTorch exports are channels-first (`[N, 3, H, W]`). The layout is read
/// from the model's declared input shape so the loader stays model-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    Nhwc,
    Nchw,
}

impl InputLayout {
    /// Interprets a 4-d input shape, returning the layout and the spatial
    /// (height, width). Returns `None` when the shape is not a recognizable
    /// image batch or the spatial dimensions are dynamic.
    pub(crate) fn from_dims(dims: &[i64]) -> Option<(Self, u32, u32)> {
        if dims.len() != 4 {
            return None;
        }
        if dims[3] == 3 && dims[1] > 0 && dims[2] > 0 {
            Some((InputLayout::Nhwc, dims[1] as u32, dims[2] as u32))
        } else if dims[1] == 3 && dims[2] > 0 && dims[3] > 0 {
            Some((InputLayout::Nchw, dims[2] as u32, dims[3] as u32))
        } else {
            None
        }
    }
}

/// A thread-safe image classifier backed by an ONNX session.
///
/// The classifier exposes exactly two things the evaluation pipeline needs:
/// the input geometry discovered from the model (so the dataset loader can
/// resize to match) and a whole-batch predict call returning one probability
/// vector per sample, in input order.
///
/// # Thread Safety
///
/// `Session` is wrapped in `Arc` and all remaining fields are plain values,
/// so the type is `Send + Sync` and can be shared across threads.
#[derive(Debug)]
pub struct ImageClassifier {
    model_path: String,
    session: Arc<Session>,
    input_name: String,
    layout: InputLayout,
    input_height: u32,
    input_width: u32,
    num_classes: Option<usize>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ImageClassifier>();
    }
};

impl ImageClassifier {
    /// Loads an ONNX classifier from `model_path` and discovers its input
    /// geometry.
    ///
    /// # Errors
    /// - `ModelError` if the file does not exist or the session fails to load
    /// - `ValidationError` if the model's tensor surface is not a single
    ///   4-d image input with static spatial dimensions and one output
    pub fn from_file<P: AsRef<Path>>(
        model_path: P,
        config: &RuntimeConfig,
    ) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ClassifierError::ModelError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let session = create_session_builder(config)?.commit_from_file(model_path)?;
        Self::validate_model(&session)?;

        let input = &session.inputs[0];
        let input_name = input.name.clone();
        let dims = input
            .input_type
            .tensor_dimensions()
            .ok_or_else(|| {
                ClassifierError::ValidationError("Model input is not a tensor".to_string())
            })?
            .clone();
        let (layout, input_height, input_width) =
            InputLayout::from_dims(&dims).ok_or_else(|| {
                ClassifierError::ValidationError(format!(
                    "Model input shape {:?} is not a 3-channel image batch with static spatial dimensions",
                    dims
                ))
            })?;

        // The class count is only known when the output shape is static.
        let num_classes = session.outputs[0]
            .output_type
            .tensor_dimensions()
            .and_then(|d| d.last().copied())
            .filter(|&c| c > 0)
            .map(|c| c as usize);

        info!(
            "Loaded model from {} (input '{}' {}x{} {:?}, classes: {:?})",
            model_path.display(),
            input_name,
            input_height,
            input_width,
            layout,
            num_classes
        );

        Ok(Self {
            model_path: model_path.to_string_lossy().to_string(),
            session: Arc::new(session),
            input_name,
            layout,
            input_height,
            input_width,
            num_classes,
        })
    }

    /// Expected spatial input size as (height, width).
    pub fn input_size(&self) -> (u32, u32) {
        (self.input_height, self.input_width)
    }

    pub fn layout(&self) -> InputLayout {
        self.layout
    }

    /// Number of output classes, when the model declares it statically.
    pub fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    /// Returns information about the classifier's tensor surface.
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            input_name: self.input_name.clone(),
            input_height: self.input_height,
            input_width: self.input_width,
            layout: self.layout,
            num_classes: self.num_classes,
        }
    }

    /// Validates that the model exposes the tensor surface the pipeline
    /// relies on: at least one input for the image batch and at least one
    /// output for the class probabilities.
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        Self::validate_tensor_surface(session.inputs.len(), session.outputs.len())
    }

    fn validate_tensor_surface(inputs: usize, outputs: usize) -> Result<(), ClassifierError> {
        if inputs == 0 {
            return Err(ClassifierError::ValidationError(
                "Model must have at least 1 input for the image batch".to_string(),
            ));
        }
        if outputs == 0 {
            return Err(ClassifierError::ValidationError(
                "Model must have at least 1 output for class probabilities".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the whole batch through the model in a single call and returns
    /// one probability vector per sample, in input order.
    ///
    /// No batching policy is applied here: whatever internal batching the
    /// runtime performs is its own concern. Any failure is fatal to the run.
    ///
    /// # Errors
    /// - `PredictionError` if tensor creation, the run itself, or output
    ///   extraction fails, or if the output shape does not line up with the
    ///   input batch
    pub fn predict_batch(&self, batch: Array4<f32>) -> Result<Array2<f32>, ClassifierError> {
        let n = batch.shape()[0];
        let input_dyn = batch.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input).map_err(|e| {
                ClassifierError::PredictionError(format!("Failed to create input tensor: {}", e))
            })?,
        );

        let outputs = self.session.run(input_tensors).map_err(|e| {
            ClassifierError::PredictionError(format!("Failed to run model: {}", e))
        })?;
        let output = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            ClassifierError::PredictionError(format!("Failed to extract output tensor: {}", e))
        })?;

        let probabilities = output
            .into_dimensionality::<Ix2>()
            .map_err(|e| {
                ClassifierError::PredictionError(format!("Unexpected output rank: {}", e))
            })?
            .to_owned();

        if probabilities.shape()[0] != n {
            return Err(ClassifierError::PredictionError(format!(
                "Model returned {} rows for a batch of {}",
                probabilities.shape()[0],
                n
            )));
        }
        Ok(probabilities)
    }
}

/// Reduces each probability vector to the index of its maximum value.
pub fn argmax_rows(probabilities: &Array2<f32>) -> Vec<usize> {
    probabilities
        .rows()
        .into_iter()
        .map(|row| argmax(&row))
        .collect()
}

fn argmax(row: &ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_layout_channels_last() {
        let parsed = InputLayout::from_dims(&[-1, 224, 224, 3]);
        assert_eq!(parsed, Some((InputLayout::Nhwc, 224, 224)));
    }

    #[test]
    fn test_layout_channels_first() {
        let parsed = InputLayout::from_dims(&[1, 3, 230, 400]);
        assert_eq!(parsed, Some((InputLayout::Nchw, 230, 400)));
    }

    #[test]
    fn test_layout_rejects_dynamic_spatial_dims() {
        assert_eq!(InputLayout::from_dims(&[-1, -1, -1, 3]), None);
    }

    #[test]
    fn test_layout_rejects_non_image_shapes() {
        assert_eq!(InputLayout::from_dims(&[-1, 256]), None);
        assert_eq!(InputLayout::from_dims(&[-1, 10, 10, 4]), None);
    }

    #[test]
    fn test_tensor_surface_requires_input_and_output() {
        assert!(matches!(
            ImageClassifier::validate_tensor_surface(0, 1),
            Err(ClassifierError::ValidationError(_))
        ));
        assert!(matches!(
            ImageClassifier::validate_tensor_surface(1, 0),
            Err(ClassifierError::ValidationError(_))
        ));
        assert!(ImageClassifier::validate_tensor_surface(1, 1).is_ok());
        assert!(ImageClassifier::validate_tensor_surface(2, 1).is_ok());
    }

    #[test]
    fn test_argmax_rows() {
        let probabilities = array![[0.1, 0.7, 0.2], [0.5, 0.3, 0.2], [0.0, 0.0, 1.0]];
        assert_eq!(argmax_rows(&probabilities), vec![1, 0, 2]);
    }

    #[test]
    fn test_argmax_ties_pick_first() {
        let probabilities = array![[0.5, 0.5]];
        assert_eq!(argmax_rows(&probabilities), vec![0]);
    }
}
