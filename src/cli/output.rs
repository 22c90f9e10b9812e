//! Output formatting utilities

use crate::domain::metrics::{LabelTally, ScoreReport};

/// Format the score report as an aligned table, one row per label plus a
/// micro-averaged ALL row.
pub fn format_score_report(report: &ScoreReport) -> String {
    if report.is_empty() {
        return "No spans to score\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<24} {:>9} {:>9} {:>9} {:>9}\n",
        "Label", "Precision", "Recall", "F1", "Support"
    ));
    for (label, tally) in &report.per_label {
        output.push_str(&format_row(label, tally));
    }

    let totals = report.totals();
    output.push_str(&format_row("ALL", &totals));
    if totals.overlapping > 0 {
        output.push_str(&format!(
            "\n{} spurious spans overlap a reference span with the same label\n",
            totals.overlapping
        ));
    }
    output
}

fn format_row(label: &str, tally: &LabelTally) -> String {
    format!(
        "{:<24} {:>9.3} {:>9.3} {:>9.3} {:>9}\n",
        label,
        tally.precision(),
        tally.recall(),
        tally.f1(),
        tally.support()
    )
}
