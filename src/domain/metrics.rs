//! Exact character-span scoring for annotation quality

use crate::domain::tags::Span;
use std::collections::BTreeMap;

/// Match tallies for one label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTally {
    /// Predicted spans with an exactly matching reference span.
    pub correct: usize,
    /// Predicted spans without a matching reference span.
    pub spurious: usize,
    /// Reference spans no predicted span matched.
    pub missed: usize,
    /// Subset of spurious spans that overlap a same-label reference span;
    /// usually a boundary disagreement rather than a hallucination.
    pub overlapping: usize,
}

impl LabelTally {
    pub fn precision(&self) -> f64 {
        ratio(self.correct, self.correct + self.spurious)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.correct, self.correct + self.missed)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Number of reference spans carrying this label.
    pub fn support(&self) -> usize {
        self.correct + self.missed
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn overlaps(a: &Span, b: &Span) -> bool {
    a.start < b.end && b.start < a.end
}

/// Corpus-level scores, accumulated one task at a time.
#[derive(Debug, Clone, Default)]
pub struct ScoreReport {
    pub per_label: BTreeMap<String, LabelTally>,
}

impl ScoreReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one task's predicted spans against its reference spans and
    /// fold the tallies in. A predicted span is correct iff an unmatched
    /// reference span with identical start, end and label exists; matching
    /// is one-to-one.
    pub fn add_task(&mut self, reference: &[Span], predicted: &[Span]) {
        let mut reference_used = vec![false; reference.len()];

        for span in predicted {
            let exact = reference
                .iter()
                .enumerate()
                .find(|(i, r)| !reference_used[*i] && *r == span);
            let tally = self.per_label.entry(span.label.clone()).or_default();
            match exact {
                Some((i, _)) => {
                    reference_used[i] = true;
                    tally.correct += 1;
                }
                None => {
                    tally.spurious += 1;
                    if reference
                        .iter()
                        .any(|r| r.label == span.label && overlaps(r, span))
                    {
                        tally.overlapping += 1;
                    }
                }
            }
        }

        for (i, span) in reference.iter().enumerate() {
            if !reference_used[i] {
                self.per_label.entry(span.label.clone()).or_default().missed += 1;
            }
        }
    }

    /// Micro-averaged totals across labels.
    pub fn totals(&self) -> LabelTally {
        let mut totals = LabelTally::default();
        for tally in self.per_label.values() {
            totals.correct += tally.correct;
            totals.spurious += tally.spurious;
            totals.missed += tally.missed;
            totals.overlapping += tally.overlapping;
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.per_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, label: &str) -> Span {
        Span::new(start, end, label)
    }

    #[test]
    fn test_perfect_match_scores_one() {
        let mut report = ScoreReport::new();
        let spans = vec![span(0, 4, "Age"), span(10, 20, "Date")];
        report.add_task(&spans, &spans);

        let age = &report.per_label["Age"];
        assert_eq!(age.correct, 1);
        assert_eq!(age.precision(), 1.0);
        assert_eq!(age.recall(), 1.0);
        assert_eq!(age.f1(), 1.0);
        assert_eq!(report.totals().correct, 2);
    }

    #[test]
    fn test_spurious_and_missed() {
        let mut report = ScoreReport::new();
        let reference = vec![span(0, 4, "Age")];
        let predicted = vec![span(30, 35, "Age")];
        report.add_task(&reference, &predicted);

        let age = &report.per_label["Age"];
        assert_eq!(age.correct, 0);
        assert_eq!(age.spurious, 1);
        assert_eq!(age.missed, 1);
        assert_eq!(age.overlapping, 0);
        assert_eq!(age.precision(), 0.0);
        assert_eq!(age.recall(), 0.0);
        assert_eq!(age.f1(), 0.0);
    }

    #[test]
    fn test_boundary_disagreement_counts_as_overlap() {
        let mut report = ScoreReport::new();
        // Predicted "54 år", reference "54": wrong but overlapping
        report.add_task(&[span(13, 15, "Age")], &[span(13, 18, "Age")]);

        let age = &report.per_label["Age"];
        assert_eq!(age.spurious, 1);
        assert_eq!(age.overlapping, 1);
        assert_eq!(age.missed, 1);
    }

    #[test]
    fn test_label_mismatch_is_not_overlap() {
        let mut report = ScoreReport::new();
        report.add_task(&[span(0, 4, "Date")], &[span(0, 4, "Age")]);

        assert_eq!(report.per_label["Age"].spurious, 1);
        assert_eq!(report.per_label["Age"].overlapping, 0);
        assert_eq!(report.per_label["Date"].missed, 1);
    }

    #[test]
    fn test_matching_is_one_to_one() {
        let mut report = ScoreReport::new();
        // Two identical predictions, one reference: only one can match
        let reference = vec![span(0, 4, "Age")];
        let predicted = vec![span(0, 4, "Age"), span(0, 4, "Age")];
        report.add_task(&reference, &predicted);

        let age = &report.per_label["Age"];
        assert_eq!(age.correct, 1);
        assert_eq!(age.spurious, 1);
        assert_eq!(age.missed, 0);
    }

    #[test]
    fn test_accumulates_across_tasks() {
        let mut report = ScoreReport::new();
        report.add_task(&[span(0, 4, "Age")], &[span(0, 4, "Age")]);
        report.add_task(&[span(0, 4, "Age")], &[]);

        let age = &report.per_label["Age"];
        assert_eq!(age.correct, 1);
        assert_eq!(age.missed, 1);
        assert_eq!(age.support(), 2);
        assert_eq!(age.recall(), 0.5);
    }

    #[test]
    fn test_empty_report() {
        let report = ScoreReport::new();
        assert!(report.is_empty());
        assert_eq!(report.totals(), LabelTally::default());
        assert_eq!(report.totals().f1(), 0.0);
    }
}
