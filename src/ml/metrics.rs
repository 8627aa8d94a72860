//! Binary classification report.
//!
//! [`ClassificationReport::evaluate`] compares predicted against actual labels
//! and yields per-class precision, recall, F1 and support, overall accuracy,
//! macro and weighted averages and a [`ConfusionMatrix`] whose rows are the
//! true label and whose columns are the predicted label. A ratio with a zero
//! denominator is reported as 0.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SardonicError};

/// 2x2 confusion matrix indexed `[actual][predicted]`, `false` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &[bool], actual: &[bool]) -> Self {
        let mut counts = [[0; 2]; 2];
        for (&p, &a) in predicted.iter().zip(actual) {
            counts[a as usize][p as usize] += 1;
        }
        ConfusionMatrix { counts }
    }

    pub fn get(&self, actual: bool, predicted: bool) -> usize {
        self.counts[actual as usize][predicted as usize]
    }

    pub fn true_positives(&self) -> usize {
        self.get(true, true)
    }

    pub fn true_negatives(&self) -> usize {
        self.get(false, false)
    }

    pub fn false_positives(&self) -> usize {
        self.get(false, true)
    }

    pub fn false_negatives(&self) -> usize {
        self.get(true, false)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Metrics with `label` treated as the positive class.
    fn class_metrics(&self, label: bool) -> ClassMetrics {
        let hits = self.get(label, label);
        let predicted = self.get(false, label) + self.get(true, label);
        let support = self.get(label, false) + self.get(label, true);

        let precision = ratio(hits, predicted);
        let recall = ratio(hits, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            label,
            precision,
            recall,
            f1,
            support,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>8} {:>8}", "", "pred 0", "pred 1")?;
        writeln!(f, "{:>12} {:>8} {:>8}", "true 0", self.counts[0][0], self.counts[0][1])?;
        write!(f, "{:>12} {:>8} {:>8}", "true 1", self.counts[1][0], self.counts[1][1])
    }
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: bool,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Full evaluation of one set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Class `false` then class `true`.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationReport {
    /// Score `predicted` against `actual`.
    pub fn evaluate(predicted: &[bool], actual: &[bool]) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(SardonicError::DimensionMismatch {
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(SardonicError::empty_corpus("no labels to evaluate"));
        }

        let confusion_matrix = ConfusionMatrix::from_predictions(predicted, actual);
        let classes = [
            confusion_matrix.class_metrics(false),
            confusion_matrix.class_metrics(true),
        ];
        let total = confusion_matrix.total();
        let accuracy = ratio(
            confusion_matrix.true_positives() + confusion_matrix.true_negatives(),
            total,
        );

        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / 2.0,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / 2.0,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / 2.0,
            support: total,
        };
        let weight = |c: &ClassMetrics| c.support as f64 / total as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision * weight(c)).sum(),
            recall: classes.iter().map(|c| c.recall * weight(c)).sum(),
            f1: classes.iter().map(|c| c.f1 * weight(c)).sum(),
            support: total,
        };

        Ok(ClassificationReport {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
            confusion_matrix,
        })
    }

    /// Metrics for one class.
    pub fn class(&self, label: bool) -> &ClassMetrics {
        &self.classes[label as usize]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.label as u8, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = true, columns = predicted):")?;
        write!(f, "{}", self.confusion_matrix)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_confusion_matrix() {
        let predicted = [true, true, false, false, true];
        let actual = [true, false, false, true, true];
        let cm = ConfusionMatrix::from_predictions(&predicted, &actual);

        assert_eq!(cm.true_positives(), 2);
        assert_eq!(cm.true_negatives(), 1);
        assert_eq!(cm.false_positives(), 1);
        assert_eq!(cm.false_negatives(), 1);
        assert_eq!(cm.counts, [[1, 1], [1, 2]]);
        assert_eq!(cm.total(), 5);
    }

    #[test]
    fn test_report_values() {
        let predicted = [true, true, false, false, true];
        let actual = [true, false, false, true, true];
        let report = ClassificationReport::evaluate(&predicted, &actual).unwrap();

        assert!((report.accuracy - 0.6).abs() < EPS);

        let positive = report.class(true);
        assert!((positive.precision - 2.0 / 3.0).abs() < EPS);
        assert!((positive.recall - 2.0 / 3.0).abs() < EPS);
        assert_eq!(positive.support, 3);

        let negative = report.class(false);
        assert!((negative.precision - 0.5).abs() < EPS);
        assert!((negative.recall - 0.5).abs() < EPS);
        assert_eq!(negative.support, 2);

        assert!((report.macro_avg.f1 - (0.5 + 2.0 / 3.0) / 2.0).abs() < EPS);
        assert!((report.weighted_avg.recall - 0.6).abs() < EPS);
    }

    #[test]
    fn test_zero_division() {
        let report = ClassificationReport::evaluate(&[false, false], &[true, false]).unwrap();
        let positive = report.class(true);
        assert_eq!(positive.precision, 0.0);
        assert_eq!(positive.recall, 0.0);
        assert_eq!(positive.f1, 0.0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(ClassificationReport::evaluate(&[true], &[true, false]).is_err());
        assert!(ClassificationReport::evaluate(&[], &[]).is_err());
    }

    #[test]
    fn test_display() {
        let report = ClassificationReport::evaluate(&[true, false], &[true, true]).unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("rows = true"));
        assert!(text.ends_with("true 1        1        1"));
    }
}
