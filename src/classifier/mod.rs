mod error;
pub mod labels;
mod model;

pub use error::ClassifierError;
pub use labels::LabelMap;
pub use model::{argmax_rows, ImageClassifier, InputLayout};

/// Information about a loaded classifier's tensor surface.
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Name of the model's input tensor
    pub input_name: String,
    /// Expected input height in pixels
    pub input_height: u32,
    /// Expected input width in pixels
    pub input_width: u32,
    /// Whether the model expects channels-last or channels-first batches
    pub layout: InputLayout,
    /// Number of classes, when the output shape declares it statically
    pub num_classes: Option<usize>,
}
