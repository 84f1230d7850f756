//! Directory-per-class test set loading.
//!
//! The test root is laid out as `<root>/<class-name>/<image-file>`. Class
//! subdirectories sorted lexicographically define the label indices; files
//! within a class are visited in whatever order the filesystem returns,
//! which is fine because each label travels with its sample.

use std::fs;
use std::path::Path;

use image::{imageops, RgbImage};
use log::info;
use ndarray::Array4;
use thiserror::Error;

use crate::classifier::InputLayout;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// The root or a class directory could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// The root directory contains no class subdirectories
    #[error("No class directories found under {0}")]
    NoClasses(String),
    /// Every file under every class failed to decode
    #[error("No decodable images found under {0}")]
    Empty(String),
}

/// A labeled test set, resized to the model's input geometry.
///
/// `images` and `labels` are parallel: `labels[i]` is the class index of
/// `images[i]`, and both cover exactly the files that decoded successfully.
#[derive(Debug)]
pub struct TestDataset {
    class_names: Vec<String>,
    images: Vec<RgbImage>,
    labels: Vec<usize>,
    skipped: usize,
}

impl TestDataset {
    /// Walks `root`, decoding and resizing every readable image to
    /// `target` (height, width).
    ///
    /// An unreadable root or class directory is fatal. An individual file
    /// that fails to decode gets a notice on standard output and is
    /// skipped; the run continues.
    pub fn load<P: AsRef<Path>>(root: P, target: (u32, u32)) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let (height, width) = target;

        let mut class_names = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                class_names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // This order is authoritative for label indices.
        class_names.sort();
        if class_names.is_empty() {
            return Err(DatasetError::NoClasses(root.display().to_string()));
        }
        info!("Test classes: {:?}", class_names);

        let mut images = Vec::new();
        let mut labels = Vec::new();
        let mut skipped = 0;
        for (label, class_name) in class_names.iter().enumerate() {
            let class_dir = root.join(class_name);
            for entry in fs::read_dir(&class_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let path = entry.path();
                let decoded = match image::open(&path) {
                    Ok(img) => img.to_rgb8(),
                    Err(e) => {
                        // Skip notices go to stdout so they show up without
                        // any RUST_LOG configuration.
                        println!("Error reading {}: {}", path.display(), e);
                        skipped += 1;
                        continue;
                    }
                };
                let resized =
                    imageops::resize(&decoded, width, height, imageops::FilterType::Lanczos3);
                images.push(resized);
                labels.push(label);
            }
        }

        if images.is_empty() {
            return Err(DatasetError::Empty(root.display().to_string()));
        }
        info!(
            "Loaded {} test images across {} classes ({} skipped)",
            images.len(),
            class_names.len(),
            skipped
        );
        Ok(Self {
            class_names,
            images,
            labels,
            skipped,
        })
    }

    /// Class names in label-index order.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Ground-truth label indices, parallel to `images()`.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Resized RGB images, parallel to `labels()`.
    pub fn images(&self) -> &[RgbImage] {
        &self.images
    }

    /// Count of files that failed to decode and were excluded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Casts the whole set into a single `[N, H, W, 3]` or `[N, 3, H, W]`
    /// float batch with values scaled to the unit interval.
    pub fn to_batch(&self, layout: InputLayout) -> Array4<f32> {
        let n = self.images.len();
        let (width, height) = self.images[0].dimensions();
        let (width, height) = (width as usize, height as usize);

        let mut data = Vec::with_capacity(n * height * width * 3);
        for img in &self.images {
            data.extend(img.as_raw().iter().map(|&px| px as f32 / 255.0));
        }
        let nhwc = Array4::from_shape_vec((n, height, width, 3), data)
            .expect("pixel buffer length matches dataset shape");

        match layout {
            InputLayout::Nhwc => nhwc,
            InputLayout::Nchw => nhwc
                .permuted_axes([0, 3, 1, 2])
                .as_standard_layout()
                .to_owned(),
        }
    }
}
