//! Multi-class classification metrics: accuracy, confusion matrix, and an
//! sklearn-style per-class precision/recall/F1 report.

use ndarray::Array2;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// The true and predicted sequences are not index-aligned
    #[error("label sequences differ in length: {true_len} true vs {pred_len} predicted")]
    LengthMismatch { true_len: usize, pred_len: usize },
    /// A label index falls outside the class range
    #[error("label {index} is out of range for {num_classes} classes")]
    LabelOutOfRange { index: usize, num_classes: usize },
}

/// Fraction of positions where predicted equals true, as a percentage.
///
/// Both slices must be index-aligned and of equal length.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "true and predicted label sequences must be the same length"
    );
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(truth, pred)| truth == pred)
        .count();
    correct as f64 / y_true.len() as f64 * 100.0
}

/// A square table cross-tabulating true vs. predicted class counts.
///
/// Cell `(i, j)` holds the number of samples with true label `i` that were
/// predicted as `j`; rows and columns share the class-name ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    /// Tabulates true vs. predicted counts.
    ///
    /// # Errors
    /// - `LengthMismatch` when the sequences are not the same length
    /// - `LabelOutOfRange` when any label index is `>= num_classes`, e.g.
    ///   when a model emits more probability columns than the dataset has
    ///   classes
    pub fn from_labels(
        num_classes: usize,
        y_true: &[usize],
        y_pred: &[usize],
    ) -> Result<Self, MetricsError> {
        if y_true.len() != y_pred.len() {
            return Err(MetricsError::LengthMismatch {
                true_len: y_true.len(),
                pred_len: y_pred.len(),
            });
        }
        let mut counts = Array2::zeros((num_classes, num_classes));
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            for index in [truth, pred] {
                if index >= num_classes {
                    return Err(MetricsError::LabelOutOfRange { index, num_classes });
                }
            }
            counts[[truth, pred]] += 1;
        }
        Ok(Self { counts })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn get(&self, true_class: usize, predicted_class: usize) -> usize {
        self.counts[[true_class, predicted_class]]
    }

    /// Count of samples whose true label is `class` (support).
    pub fn row_total(&self, class: usize) -> usize {
        self.counts.row(class).sum()
    }

    /// Count of samples predicted as `class`.
    pub fn column_total(&self, class: usize) -> usize {
        self.counts.column(class).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Largest single cell count, used to scale heatmap shading.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }
}

/// Per-class precision, recall, F1 and support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Computes precision/recall/F1 for every class, with 0/0 defined as 0.0.
pub fn per_class_metrics(cm: &ConfusionMatrix) -> Vec<ClassMetrics> {
    (0..cm.num_classes())
        .map(|class| {
            let tp = cm.get(class, class) as f64;
            let predicted_pos = cm.column_total(class) as f64;
            let actual_pos = cm.row_total(class) as f64;
            let precision = if predicted_pos > 0.0 { tp / predicted_pos } else { 0.0 };
            let recall = if actual_pos > 0.0 { tp / actual_pos } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support: cm.row_total(class),
            }
        })
        .collect()
}

/// Formats an sklearn-style classification report: one row per class plus
/// accuracy, macro-average and weighted-average rows.
pub fn classification_report(cm: &ConfusionMatrix, class_names: &[String]) -> String {
    assert_eq!(
        cm.num_classes(),
        class_names.len(),
        "one class name per confusion matrix row is required"
    );
    let metrics = per_class_metrics(cm);
    let total = cm.total();

    let name_width = class_names
        .iter()
        .map(|name| name.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(12);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = name_width
    ));

    for (name, m) in class_names.iter().zip(&metrics) {
        out.push_str(&format!(
            "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
            name,
            m.precision,
            m.recall,
            m.f1,
            m.support,
            width = name_width
        ));
    }
    out.push('\n');

    let correct: usize = (0..cm.num_classes()).map(|c| cm.get(c, c)).sum();
    let accuracy_frac = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    out.push_str(&format!(
        "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy_frac,
        total,
        width = name_width
    ));

    let n = metrics.len().max(1) as f64;
    let macro_p = metrics.iter().map(|m| m.precision).sum::<f64>() / n;
    let macro_r = metrics.iter().map(|m| m.recall).sum::<f64>() / n;
    let macro_f1 = metrics.iter().map(|m| m.f1).sum::<f64>() / n;
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "macro avg",
        macro_p,
        macro_r,
        macro_f1,
        total,
        width = name_width
    ));

    let weight = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            return 0.0;
        }
        metrics
            .iter()
            .map(|m| f(m) * m.support as f64)
            .sum::<f64>()
            / total as f64
    };
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "weighted avg",
        weight(|m| m.precision),
        weight(|m| m.recall),
        weight(|m| m.f1),
        total,
        width = name_width
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: usize = 0;
    const B: usize = 1;

    #[test]
    fn test_accuracy_all_correct() {
        let labels = vec![A, A, A, B, B, B];
        assert_eq!(accuracy(&labels, &labels), 100.0);
    }

    #[test]
    fn test_accuracy_one_misclassified() {
        // true [A,A,B,B], predicted [A,B,B,B]
        assert_eq!(accuracy(&[A, A, B, B], &[A, B, B, B]), 75.0);
    }

    #[test]
    fn test_accuracy_empty() {
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix_all_correct() {
        let labels = vec![A, A, A, B, B, B];
        let cm = ConfusionMatrix::from_labels(2, &labels, &labels).unwrap();
        assert_eq!(cm.get(A, A), 3);
        assert_eq!(cm.get(A, B), 0);
        assert_eq!(cm.get(B, A), 0);
        assert_eq!(cm.get(B, B), 3);
    }

    #[test]
    fn test_confusion_matrix_one_misclassified() {
        let cm = ConfusionMatrix::from_labels(2, &[A, A, B, B], &[A, B, B, B]).unwrap();
        assert_eq!(cm.get(A, A), 1);
        assert_eq!(cm.get(A, B), 1);
        assert_eq!(cm.get(B, A), 0);
        assert_eq!(cm.get(B, B), 2);
    }

    #[test]
    fn test_confusion_matrix_sums() {
        let y_true = vec![0, 0, 1, 1, 2, 2, 2];
        let y_pred = vec![0, 1, 1, 1, 2, 0, 2];
        let cm = ConfusionMatrix::from_labels(3, &y_true, &y_pred).unwrap();
        assert_eq!(cm.total(), y_true.len());
        for class in 0..3 {
            let expected = y_true.iter().filter(|&&t| t == class).count();
            assert_eq!(cm.row_total(class), expected);
        }
    }

    #[test]
    fn test_per_class_metrics() {
        // true [A,A,B,B], predicted [A,B,B,B]:
        //   A: tp=1, predicted-positive=1, actual-positive=2
        //   B: tp=2, predicted-positive=3, actual-positive=2
        let cm = ConfusionMatrix::from_labels(2, &[A, A, B, B], &[A, B, B, B]).unwrap();
        let metrics = per_class_metrics(&cm);
        assert!((metrics[A].precision - 1.0).abs() < 1e-9);
        assert!((metrics[A].recall - 0.5).abs() < 1e-9);
        assert!((metrics[B].precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((metrics[B].recall - 1.0).abs() < 1e-9);
        assert_eq!(metrics[A].support, 2);
        assert_eq!(metrics[B].support, 2);
    }

    #[test]
    fn test_metrics_with_absent_class() {
        // Nothing predicted as class 1 and nothing truly class 1: all zeros.
        let cm = ConfusionMatrix::from_labels(2, &[0, 0], &[0, 0]).unwrap();
        let metrics = per_class_metrics(&cm);
        assert_eq!(metrics[1].precision, 0.0);
        assert_eq!(metrics[1].recall, 0.0);
        assert_eq!(metrics[1].f1, 0.0);
        assert_eq!(metrics[1].support, 0);
    }

    #[test]
    fn test_out_of_range_label_is_rejected() {
        // A model with more probability columns than the dataset has classes
        // can argmax to an index past the table edge.
        let result = ConfusionMatrix::from_labels(2, &[0, 1], &[0, 2]);
        assert_eq!(
            result,
            Err(MetricsError::LabelOutOfRange {
                index: 2,
                num_classes: 2
            })
        );
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let result = ConfusionMatrix::from_labels(2, &[0, 1], &[0]);
        assert_eq!(
            result,
            Err(MetricsError::LengthMismatch {
                true_len: 2,
                pred_len: 1
            })
        );
    }

    #[test]
    fn test_classification_report_format() {
        let names = vec!["A".to_string(), "B".to_string()];
        let cm = ConfusionMatrix::from_labels(2, &[A, A, B, B], &[A, B, B, B]).unwrap();
        let report = classification_report(&cm, &names);
        assert!(report.contains("precision"));
        assert!(report.contains("recall"));
        assert!(report.contains("f1-score"));
        assert!(report.contains("support"));
        assert!(report.contains("accuracy"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("weighted avg"));
        assert!(report.contains("0.75"));
    }
}
