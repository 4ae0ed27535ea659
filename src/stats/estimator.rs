//! Sentence classification outcomes and the confusion-matrix estimator.

use crate::grammar::Label;

/// Outcome of parsing one labeled sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

impl Classification {
    /// Compares a parse verdict with the sentence label.
    ///
    /// Unknown labels cannot be classified and yield `None`.
    pub fn of(label: Label, belongs_to_grammar: bool) -> Option<Self> {
        match (label, belongs_to_grammar) {
            (Label::Positive, true) => Some(Self::TruePositive),
            (Label::Positive, false) => Some(Self::FalseNegative),
            (Label::Negative, true) => Some(Self::FalsePositive),
            (Label::Negative, false) => Some(Self::TrueNegative),
            (Label::Unknown, _) => None,
        }
    }
}

/// TP/TN/FP/FN counts over one parse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::TruePositive => self.true_positives += 1,
            Classification::TrueNegative => self.true_negatives += 1,
            Classification::FalsePositive => self.false_positives += 1,
            Classification::FalseNegative => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Fraction of correctly classified sentences. Used as grammar fitness.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn sensitivity(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.sensitivity();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert_eq!(
            Classification::of(Label::Positive, true),
            Some(Classification::TruePositive)
        );
        assert_eq!(
            Classification::of(Label::Positive, false),
            Some(Classification::FalseNegative)
        );
        assert_eq!(
            Classification::of(Label::Negative, true),
            Some(Classification::FalsePositive)
        );
        assert_eq!(
            Classification::of(Label::Negative, false),
            Some(Classification::TrueNegative)
        );
        assert_eq!(Classification::of(Label::Unknown, true), None);
    }

    #[test]
    fn test_metrics() {
        let m = ConfusionMatrix {
            true_positives: 3,
            true_negatives: 4,
            false_positives: 1,
            false_negatives: 2,
        };
        assert_eq!(m.total(), 10);
        assert!((m.accuracy() - 0.7).abs() < 1e-12);
        assert!((m.sensitivity() - 0.6).abs() < 1e-12);
        assert!((m.specificity() - 0.8).abs() < 1e-12);
        assert!((m.precision() - 0.75).abs() < 1e-12);
        let f1 = 2.0 * 0.75 * 0.6 / 1.35;
        assert!((m.f1() - f1).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_is_zero() {
        let m = ConfusionMatrix::default();
        assert_eq!(m.accuracy(), 0.0);
        assert_eq!(m.f1(), 0.0);
    }
}
