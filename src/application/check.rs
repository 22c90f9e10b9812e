//! Annotation quality scoring use case
//!
//! Compares the machine-written tags of each document against the regions
//! a human reviewer kept, and accumulates precision/recall/F1 per label.

use crate::domain::metrics::ScoreReport;
use crate::domain::tags::{list_annotations, strip_tags, Span, CATCH_ALL_LABEL};
use crate::error::Result;
use crate::infrastructure::corpus::{load_review_tasks, ReviewTask};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

fn age_suffix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s*\bår(\s+gammel)?$").unwrap())
}

/// Options for the quality check
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Review export to score.
    pub annotations: PathBuf,
    /// Collapse every label to the catch-all, scoring detection only.
    pub phi_only: bool,
    /// Trim trailing `år`/`år gammel` from spans before comparing, so an
    /// annotation of `54 år` and one of `54` count as the same age.
    pub clean_ages: bool,
    pub verbose: bool,
}

/// Execute the quality check and return the accumulated scores.
pub fn execute(options: &CheckOptions) -> Result<ScoreReport> {
    // 1. Load the review export.
    let tasks = load_review_tasks(&options.annotations)?;
    if options.verbose {
        println!(
            "Scoring {} tasks from {}",
            tasks.len(),
            options.annotations.display()
        );
    }

    // 2. Score task by task.
    let mut report = ScoreReport::new();
    for task in &tasks {
        if options.verbose {
            warn_on_mismatches(task);
        }
        let reference = reference_spans(task, options.phi_only, options.clean_ages);
        let predicted = predicted_spans(task, options.phi_only, options.clean_ages);
        report.add_task(&reference, &predicted);
    }
    Ok(report)
}

/// The human reference: one span per reviewed region. A region can carry
/// several labels in the export format, but reviewers assign exactly one;
/// regions without any are skipped.
fn reference_spans(task: &ReviewTask, phi_only: bool, clean_ages: bool) -> Vec<Span> {
    task.label
        .iter()
        .filter_map(|region| {
            let label = region.labels.first()?.as_str();
            let label = if phi_only { CATCH_ALL_LABEL } else { label };
            let mut span = Span::new(region.start, region.end, label);
            if clean_ages {
                clean_age_suffix(&mut span, &task.text);
            }
            Some(span)
        })
        .collect()
}

/// What the machine annotated, decoded from the tagged document.
fn predicted_spans(task: &ReviewTask, phi_only: bool, clean_ages: bool) -> Vec<Span> {
    let plain = strip_tags(&task.original_text);
    let mut spans = list_annotations(&task.original_text, None);
    for span in &mut spans {
        if phi_only {
            span.label = CATCH_ALL_LABEL.to_string();
        }
        if clean_ages {
            clean_age_suffix(span, &plain);
        }
    }
    spans
}

/// Trim a trailing age suffix from the span. `plain` is the text the
/// span offsets index into; offsets are character counts, so the span
/// text is carved out char by char.
fn clean_age_suffix(span: &mut Span, plain: &str) {
    let text: String = plain
        .chars()
        .skip(span.start)
        .take(span.end.saturating_sub(span.start))
        .collect();
    if let Some(m) = age_suffix_regex().find(&text) {
        span.end -= text[m.start()..].chars().count();
    }
}

fn warn_on_mismatches(task: &ReviewTask) {
    let stripped = strip_tags(&task.original_text);
    if stripped != task.text {
        eprintln!(
            "Warning: task {}: review text differs from the untagged document",
            task.id
        );
    }
    if stripped.contains('<') {
        eprintln!(
            "Warning: task {}: tagged document has unmatched '<' characters",
            task.id
        );
    }
}
