//! Per-generation statistics series.
//!
//! Each generation records, per named [`Criterion`], the value for that
//! step, the step-local min/max, and the running global min/max across all
//! generations so far.

use std::collections::BTreeMap;

use super::estimator::ConfusionMatrix;
use super::statistics::FitnessSummary;

/// Named quantity tracked across generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Criterion {
    /// Grammar fitness: classification accuracy of the parse pass.
    Fitness,
    Sensitivity,
    Specificity,
    Precision,
    F1,
    /// Rule fitness: mean over rules, with step min/max over rules.
    RuleFitness,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::Fitness,
        Criterion::Sensitivity,
        Criterion::Specificity,
        Criterion::Precision,
        Criterion::F1,
        Criterion::RuleFitness,
    ];
}

/// Values of one criterion at one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriterionValue {
    pub current: f64,
    pub step_min: f64,
    pub step_max: f64,
    pub global_min: f64,
    pub global_max: f64,
}

/// Statistics of one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    pub step: usize,
    pub confusion: ConfusionMatrix,
    pub rule_count: usize,
    pub non_terminal_rule_count: usize,
    pub criteria: BTreeMap<Criterion, CriterionValue>,
}

impl GenerationStats {
    pub fn value(&self, criterion: Criterion) -> Option<&CriterionValue> {
        self.criteria.get(&criterion)
    }

    pub fn fitness(&self) -> f64 {
        self.criteria
            .get(&Criterion::Fitness)
            .map_or(0.0, |v| v.current)
    }
}

/// Ordered series of generation statistics.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsSeries {
    generations: Vec<GenerationStats>,
    global: BTreeMap<Criterion, (f64, f64)>,
}

impl StatisticsSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one generation and returns it.
    pub fn record(
        &mut self,
        step: usize,
        confusion: ConfusionMatrix,
        rules: FitnessSummary,
        rule_count: usize,
        non_terminal_rule_count: usize,
    ) -> &GenerationStats {
        let mut criteria = BTreeMap::new();
        for criterion in Criterion::ALL {
            let (current, step_min, step_max) = match criterion {
                Criterion::Fitness => flat(confusion.accuracy()),
                Criterion::Sensitivity => flat(confusion.sensitivity()),
                Criterion::Specificity => flat(confusion.specificity()),
                Criterion::Precision => flat(confusion.precision()),
                Criterion::F1 => flat(confusion.f1()),
                Criterion::RuleFitness => (rules.mean, rules.min, rules.max),
            };
            let (global_min, global_max) = {
                let entry = self
                    .global
                    .entry(criterion)
                    .or_insert((step_min, step_max));
                entry.0 = entry.0.min(step_min);
                entry.1 = entry.1.max(step_max);
                *entry
            };
            criteria.insert(
                criterion,
                CriterionValue {
                    current,
                    step_min,
                    step_max,
                    global_min,
                    global_max,
                },
            );
        }
        self.generations.push(GenerationStats {
            step,
            confusion,
            rule_count,
            non_terminal_rule_count,
            criteria,
        });
        // just pushed
        &self.generations[self.generations.len() - 1]
    }

    /// Running global maximum of a criterion, `None` before any generation.
    pub fn global_max(&self, criterion: Criterion) -> Option<f64> {
        self.global.get(&criterion).map(|(_, max)| *max)
    }

    pub fn global_min(&self, criterion: Criterion) -> Option<f64> {
        self.global.get(&criterion).map(|(min, _)| *min)
    }

    /// Best grammar fitness reached so far.
    pub fn best_fitness(&self) -> Option<f64> {
        self.global_max(Criterion::Fitness)
    }

    pub fn generations(&self) -> &[GenerationStats] {
        &self.generations
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.generations.last()
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

fn flat(value: f64) -> (f64, f64, f64) {
    (value, value, value)
}
