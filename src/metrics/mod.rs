//! Multi-class confusion matrix and the metrics derived from it
//!
//! Every metric is recomputed from the current counts on each call. Class
//! averages run over the classes seen as *real* classes; a class that was
//! only ever predicted contributes to column sums but is not averaged.
//!
//! Per-class precision, recall and F-measure are `0` when their denominator
//! is zero. With no instances at all, accuracy and kappa are NaN.

use crate::core::ClassCode;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Counts of (real, predicted) class pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfusionMatrix {
    matrix: BTreeMap<ClassCode, BTreeMap<ClassCode, usize>>,
    real_classes: BTreeSet<ClassCode>,
    predicted_classes: BTreeSet<ClassCode>,
    total: usize,
    correct: usize,
}

impl ConfusionMatrix {
    /// Create an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction
    pub fn add(&mut self, real: ClassCode, predicted: ClassCode) {
        *self
            .matrix
            .entry(real)
            .or_default()
            .entry(predicted)
            .or_insert(0) += 1;
        self.real_classes.insert(real);
        self.predicted_classes.insert(predicted);
        self.total += 1;
        if real == predicted {
            self.correct += 1;
        }
    }

    /// Add every cell of `other` into this matrix
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        for (&real, row) in &other.matrix {
            for (&predicted, &count) in row {
                *self
                    .matrix
                    .entry(real)
                    .or_default()
                    .entry(predicted)
                    .or_insert(0) += count;
            }
        }
        self.real_classes.extend(&other.real_classes);
        self.predicted_classes.extend(&other.predicted_classes);
        self.total += other.total;
        self.correct += other.correct;
    }

    /// Number of recorded predictions
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of recorded predictions that matched the real class
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Classes seen as real classes, ascending
    pub fn real_classes(&self) -> &BTreeSet<ClassCode> {
        &self.real_classes
    }

    /// Classes seen as predictions, ascending
    pub fn predicted_classes(&self) -> &BTreeSet<ClassCode> {
        &self.predicted_classes
    }

    /// Count of the cell (real, predicted)
    pub fn count(&self, real: ClassCode, predicted: ClassCode) -> usize {
        self.matrix
            .get(&real)
            .and_then(|row| row.get(&predicted))
            .copied()
            .unwrap_or(0)
    }

    /// Instances whose real class is `class`
    pub fn row_sum(&self, class: ClassCode) -> usize {
        self.matrix
            .get(&class)
            .map_or(0, |row| row.values().sum())
    }

    /// Instances predicted as `class`
    pub fn column_sum(&self, class: ClassCode) -> usize {
        self.matrix
            .values()
            .filter_map(|row| row.get(&class))
            .sum()
    }

    /// `correct / total`
    pub fn accuracy(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }

    /// Correct predictions of `class` over its real instances; 0 when it has none
    pub fn recall(&self, class: ClassCode) -> f64 {
        ratio_or_zero(self.count(class, class), self.row_sum(class))
    }

    /// Correct predictions of `class` over all predictions of it; 0 when it is never predicted
    pub fn precision(&self, class: ClassCode) -> f64 {
        ratio_or_zero(self.count(class, class), self.column_sum(class))
    }

    /// Harmonic mean of precision and recall for one class
    pub fn f_measure(&self, class: ClassCode) -> f64 {
        harmonic(self.precision(class), self.recall(class))
    }

    /// Unweighted mean of [`recall`](Self::recall) over the real classes; NaN when empty
    pub fn average_recall(&self) -> f64 {
        self.mean_over_real_classes(|class| self.recall(class))
    }

    /// Unweighted mean of [`precision`](Self::precision) over the real classes; NaN when empty
    pub fn average_precision(&self) -> f64 {
        self.mean_over_real_classes(|class| self.precision(class))
    }

    /// Mean of the per-class F-measures
    pub fn macro_f(&self) -> f64 {
        self.mean_over_real_classes(|class| self.f_measure(class))
    }

    /// Diagonal over column sums, pooled across the real classes
    pub fn micro_precision(&self) -> f64 {
        let (tp, tp_fp, _) = self.pooled_counts();
        ratio_or_zero(tp, tp_fp)
    }

    /// Diagonal over row sums, pooled across the real classes
    pub fn micro_recall(&self) -> f64 {
        let (tp, _, tp_fn) = self.pooled_counts();
        ratio_or_zero(tp, tp_fn)
    }

    /// F-measure of the pooled precision and recall
    pub fn micro_f(&self) -> f64 {
        harmonic(self.micro_precision(), self.micro_recall())
    }

    /// Cohen's kappa, `(p0 - pe) / (1 - pe)` with `p0` the accuracy.
    ///
    /// `pe` accumulates `row_sum * column_sum / total` per real class and is
    /// divided by `total` once more after the loop.
    pub fn kappa(&self) -> f64 {
        let total = self.total as f64;
        let mut expected = 0.0;
        for &class in &self.real_classes {
            expected += (self.row_sum(class) * self.column_sum(class)) as f64 / total;
        }
        expected /= total;

        (self.accuracy() - expected) / (1.0 - expected)
    }

    fn mean_over_real_classes<F: Fn(ClassCode) -> f64>(&self, metric: F) -> f64 {
        let sum: f64 = self.real_classes.iter().map(|&class| metric(class)).sum();
        sum / self.real_classes.len() as f64
    }

    /// (true positives, TP + FP, TP + FN) summed over the real classes
    fn pooled_counts(&self) -> (usize, usize, usize) {
        self.real_classes
            .iter()
            .fold((0, 0, 0), |(tp, tp_fp, tp_fn), &class| {
                (
                    tp + self.count(class, class),
                    tp_fp + self.column_sum(class),
                    tp_fn + self.row_sum(class),
                )
            })
    }
}

fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r > 0.0 {
        2.0 * p * r / (p + r)
    } else {
        0.0
    }
}

impl fmt::Display for ConfusionMatrix {
    /// Rows are real classes, columns predicted classes
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<ClassCode> = self
            .real_classes
            .union(&self.predicted_classes)
            .copied()
            .collect();

        write!(f, "{:>12}", "real\\pred")?;
        for &column in &columns {
            write!(f, " {:>8}", class_label(column))?;
        }
        writeln!(f)?;

        for &real in &self.real_classes {
            write!(f, "{:>12}", class_label(real))?;
            for &column in &columns {
                write!(f, " {:>8}", self.count(real, column))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn class_label(class: ClassCode) -> String {
    if class == crate::core::NO_PREDICTION {
        "?".to_string()
    } else {
        class.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NO_PREDICTION;
    use approx::assert_abs_diff_eq;

    fn reference_matrix() -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new();
        for (real, predicted) in [(1, 0), (0, 0), (0, 1), (1, 1), (2, 1)] {
            cm.add(real, predicted);
        }
        cm
    }

    #[test]
    fn test_counts() {
        let cm = reference_matrix();
        assert_eq!(cm.total(), 5);
        assert_eq!(cm.correct(), 2);
        assert_eq!(cm.count(0, 1), 1);
        assert_eq!(cm.count(2, 0), 0);
        assert_eq!(cm.row_sum(0), 2);
        assert_eq!(cm.row_sum(2), 1);
        assert_eq!(cm.column_sum(1), 3);
        assert_eq!(cm.column_sum(2), 0);
        assert_eq!(cm.real_classes().len(), 3);
        assert_eq!(cm.predicted_classes().len(), 2);
    }

    #[test]
    fn test_reference_metrics() {
        let cm = reference_matrix();
        assert_abs_diff_eq!(cm.accuracy(), 0.40, epsilon = 0.01);
        assert_abs_diff_eq!(cm.average_recall(), 0.33, epsilon = 0.01);
        assert_abs_diff_eq!(cm.average_precision(), 0.27, epsilon = 0.01);
        assert_abs_diff_eq!(cm.micro_f(), 0.40, epsilon = 0.01);
        assert_abs_diff_eq!(cm.macro_f(), 0.30, epsilon = 0.01);
        assert_abs_diff_eq!(cm.kappa(), 0.00, epsilon = 0.01);
    }

    #[test]
    fn test_metrics_after_one_more_pair() {
        let mut cm = reference_matrix();
        cm.add(0, 0);
        assert_abs_diff_eq!(cm.accuracy(), 0.50, epsilon = 0.01);
        assert_abs_diff_eq!(cm.kappa(), 0.14, epsilon = 0.01);
    }

    #[test]
    fn test_per_class_metrics() {
        let cm = reference_matrix();
        assert_abs_diff_eq!(cm.recall(0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.precision(1), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.f_measure(1), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_denominators_give_zero() {
        let cm = reference_matrix();
        // class 2 is never predicted and never right
        assert_eq!(cm.precision(2), 0.0);
        assert_eq!(cm.recall(2), 0.0);
        assert_eq!(cm.f_measure(2), 0.0);
        // class 9 was never seen at all
        assert_eq!(cm.recall(9), 0.0);
        assert_eq!(cm.precision(9), 0.0);
    }

    #[test]
    fn test_perfect_predictions() {
        let mut cm = ConfusionMatrix::new();
        for class in [3, 3, 4, 5] {
            cm.add(class, class);
        }
        assert_eq!(cm.accuracy(), 1.0);
        assert_eq!(cm.macro_f(), 1.0);
        assert_eq!(cm.micro_f(), 1.0);
        assert_abs_diff_eq!(cm.kappa(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_matrix_is_undefined() {
        let cm = ConfusionMatrix::new();
        assert!(cm.accuracy().is_nan());
        assert!(cm.kappa().is_nan());
        assert!(cm.average_recall().is_nan());
        assert!(cm.average_precision().is_nan());
        assert_eq!(cm.recall(0), 0.0);
        assert_eq!(cm.precision(0), 0.0);
    }

    #[test]
    fn test_counts_never_decrease() {
        let mut cm = ConfusionMatrix::new();
        let mut last = (0, 0);
        for (real, predicted) in [(0, 1), (1, 1), (0, 0), (2, 0), (1, 1)] {
            cm.add(real, predicted);
            assert!(cm.total() > last.0);
            assert!(cm.correct() >= last.1);
            assert_eq!(cm.accuracy(), cm.correct() as f64 / cm.total() as f64);
            last = (cm.total(), cm.correct());
        }
    }

    #[test]
    fn test_predicted_only_classes_are_not_averaged() {
        let mut cm = ConfusionMatrix::new();
        cm.add(0, 0);
        cm.add(0, NO_PREDICTION);
        assert_eq!(cm.real_classes().len(), 1);
        assert!(cm.predicted_classes().contains(&NO_PREDICTION));
        assert_eq!(cm.average_precision(), 1.0);
        assert_eq!(cm.average_recall(), 0.5);
        // the unanswered instance still counts against pooled recall
        assert_eq!(cm.micro_precision(), 1.0);
        assert_eq!(cm.micro_recall(), 0.5);
    }

    #[test]
    fn test_merge_matches_replay() {
        let mut left = ConfusionMatrix::new();
        left.add(1, 0);
        left.add(0, 0);
        let mut right = ConfusionMatrix::new();
        right.add(0, 1);
        right.add(1, 1);
        right.add(2, 1);

        left.merge(&right);
        assert_eq!(left, reference_matrix());
    }

    #[test]
    fn test_display() {
        let mut cm = ConfusionMatrix::new();
        cm.add(0, 0);
        cm.add(1, NO_PREDICTION);
        let rendered = cm.to_string();
        assert!(rendered.contains("real\\pred"));
        assert!(rendered.contains('?'));
        assert_eq!(rendered.lines().count(), 3);
    }
}
