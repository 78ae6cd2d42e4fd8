use std::fmt::Write;

use crate::models::{AverageMetrics, EvaluationSummary};

fn average_row(output: &mut String, name: &str, avg: &AverageMetrics) {
    let _ = writeln!(
        output,
        "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        name, avg.precision, avg.recall, avg.f1, avg.support
    );
}

/// Per-class precision/recall/F1/support table with accuracy and averages.
pub fn classification_report(summary: &EvaluationSummary) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:>14} {:>10} {:>10} {:>10} {:>10}",
        "", "precision", "recall", "f1-score", "support"
    );
    let _ = writeln!(output);

    for class in summary.classes.iter() {
        let _ = writeln!(
            output,
            "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            class.label, class.precision, class.recall, class.f1, class.support
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
        "accuracy", "", "", summary.accuracy, summary.test_rows
    );
    average_row(&mut output, "macro avg", &summary.macro_avg);
    average_row(&mut output, "weighted avg", &summary.weighted_avg);
    output
}

pub fn confusion_matrix(matrix: &[Vec<usize>]) -> String {
    let width = matrix
        .iter()
        .flatten()
        .map(|count| count.to_string().len())
        .max()
        .unwrap_or(1);

    let rows: Vec<String> = matrix
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|count| format!("{:>width$}", count, width = width))
                .collect();
            format!("[{}]", cells.join(" "))
        })
        .collect();

    format!("[{}]", rows.join("\n "))
}

/// Console text for a finished run: features, metrics and the sample prediction.
pub fn console_output(summary: &EvaluationSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Features used: {:?}", summary.feature_names);
    let _ = writeln!(output);
    let _ = writeln!(output, "Model Accuracy: {}", summary.accuracy);
    let _ = writeln!(output);
    let _ = writeln!(output, "Classification Report:");
    let _ = write!(output, "{}", classification_report(summary));
    let _ = writeln!(output, "Confusion Matrix:");
    let _ = writeln!(output, "{}", confusion_matrix(&summary.confusion_matrix));
    let _ = writeln!(output);
    let _ = writeln!(output, "--- FINAL OUTPUT ---");
    let _ = writeln!(output, "Predicted Risk Level: {}", summary.sample.risk_label);
    let _ = writeln!(output, "Risk Probability Score: {:.2}", summary.sample.probability);
    let _ = writeln!(output, "Recommendation: {}", summary.sample.recommendation);

    output
}

pub fn build_report(summary: &EvaluationSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Mental Health Risk Report");
    let _ = writeln!(
        output,
        "Run {} generated {} from {}",
        summary.run_id,
        summary.generated_at.format("%Y-%m-%d %H:%M UTC"),
        summary.config.csv_path.display()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Data");
    let _ = writeln!(
        output,
        "- {} of {} survey rows kept",
        summary.data.rows_kept, summary.data.rows_read
    );
    let _ = writeln!(
        output,
        "- dropped: {} incomplete, {} unknown CGPA bracket, {} unreadable age",
        summary.data.dropped_missing, summary.data.dropped_unmapped_cgpa, summary.data.dropped_bad_age
    );
    let _ = writeln!(
        output,
        "- split: {} train / {} test (test fraction {}, seed {})",
        summary.train_rows, summary.test_rows, summary.config.test_fraction, summary.config.seed
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Risk Mix");
    if summary.class_mix.is_empty() {
        let _ = writeln!(output, "No labelled rows.");
    } else {
        for (label, count) in summary.class_mix.iter() {
            let _ = writeln!(output, "- {}: {} respondents", label, count);
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Features");
    for name in summary.feature_names.iter() {
        let _ = writeln!(output, "- {}", name);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Training");
    let status = if summary.training.converged {
        "converged"
    } else {
        "stopped at the iteration cap"
    };
    let _ = writeln!(
        output,
        "Solver {} after {} iterations (loss {:.4}).",
        status, summary.training.iterations, summary.training.final_loss
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Evaluation");
    let _ = writeln!(output, "Accuracy: {:.4}", summary.accuracy);
    let _ = writeln!(output);
    let _ = writeln!(output, "| Risk level | Precision | Recall | F1 | Support |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for class in summary.classes.iter() {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} | {} |",
            class.label, class.precision, class.recall, class.f1, class.support
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "### Confusion Matrix");
    if summary.classes.is_empty() {
        let _ = writeln!(output, "No test predictions.");
    } else {
        let header: Vec<&str> = summary.classes.iter().map(|c| c.label.as_str()).collect();
        let _ = writeln!(output, "| true \\ predicted | {} |", header.join(" | "));
        let _ = writeln!(output, "|---|{}", "---|".repeat(header.len()));
        for (class, row) in summary.classes.iter().zip(&summary.confusion_matrix) {
            let cells: Vec<String> = row.iter().map(|count| count.to_string()).collect();
            let _ = writeln!(output, "| {} | {} |", class.label, cells.join(" | "));
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Sample Prediction");
    let _ = writeln!(output, "- features: {:?}", summary.sample.features);
    let _ = writeln!(output, "- predicted risk level: {}", summary.sample.risk_label);
    let _ = writeln!(output, "- probability: {:.2}", summary.sample.probability);
    let _ = writeln!(output, "- recommendation: {}", summary.sample.recommendation);

    output
}
