use crate::models::{AverageMetrics, ClassMetrics};

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true
        .iter()
        .zip(y_pred)
        .filter(|(truth, pred)| truth == pred)
        .count();
    hits as f64 / y_true.len() as f64
}

/// Every code that appears in either label list, ascending.
pub fn class_labels(y_true: &[usize], y_pred: &[usize]) -> Vec<usize> {
    let mut labels: Vec<usize> = y_true.iter().chain(y_pred).copied().collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Rows are true classes, columns predicted classes, both in `labels` order.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], labels: &[usize]) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; labels.len()]; labels.len()];
    for (truth, pred) in y_true.iter().zip(y_pred) {
        let row = labels.iter().position(|label| label == truth);
        let col = labels.iter().position(|label| label == pred);
        if let (Some(row), Some(col)) = (row, col) {
            matrix[row][col] += 1;
        }
    }
    matrix
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Precision, recall and F1 for each class; undefined ratios count as 0.
/// `label_names` is parallel to `labels`.
pub fn per_class_metrics(
    y_true: &[usize],
    y_pred: &[usize],
    labels: &[usize],
    label_names: &[String],
) -> Vec<ClassMetrics> {
    debug_assert_eq!(labels.len(), label_names.len());
    let matrix = confusion_matrix(y_true, y_pred, labels);

    labels
        .iter()
        .zip(label_names)
        .enumerate()
        .map(|(index, (&code, name))| {
            let true_positive = matrix[index][index];
            let support: usize = matrix[index].iter().sum();
            let predicted: usize = matrix.iter().map(|row| row[index]).sum();
            let precision = ratio(true_positive, predicted);
            let recall = ratio(true_positive, support);

            ClassMetrics {
                code,
                label: name.clone(),
                precision,
                recall,
                f1: f1_score(precision, recall),
                support,
            }
        })
        .collect()
}

pub fn macro_average(classes: &[ClassMetrics]) -> AverageMetrics {
    let count = classes.len().max(1) as f64;
    AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / count,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / count,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / count,
        support: classes.iter().map(|c| c.support).sum(),
    }
}

pub fn weighted_average(classes: &[ClassMetrics]) -> AverageMetrics {
    let support: usize = classes.iter().map(|c| c.support).sum();
    let weight = |value: fn(&ClassMetrics) -> f64| {
        if support == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / support as f64
        }
    };

    AverageMetrics {
        precision: weight(|c: &ClassMetrics| c.precision),
        recall: weight(|c: &ClassMetrics| c.recall),
        f1: weight(|c: &ClassMetrics| c.f1),
        support,
    }
}
