//! Evolution configuration.

use super::operators::{GeneticOperator, OperatorKind};
use super::selection::Selector;
use crate::adding::AddingRuleHint;

/// Configuration of the per-generation evolutionary step.
///
/// # Defaults
///
/// ```
/// use gcs_induction::evolution::EvolutionConfig;
///
/// let config = EvolutionConfig::default();
/// assert_eq!(config.selectors.len(), 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionConfig {
    /// Selectors, evaluated in order; each contributes one rule.
    pub selectors: Vec<Selector>,

    /// Genetic operators. Applied grouped by ascending arity, in listed
    /// order within a group.
    pub operators: Vec<GeneticOperator>,

    /// Hint used to submit offspring to the supervisor.
    pub hint: AddingRuleHint,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            selectors: vec![
                Selector::Tournament(2),
                Selector::Tournament(2),
                Selector::Random,
                Selector::Random,
            ],
            operators: vec![
                GeneticOperator::new(OperatorKind::Inversion, 0.2),
                GeneticOperator::new(OperatorKind::ParentMutation, 0.1),
                GeneticOperator::new(OperatorKind::LeftChildMutation, 0.1),
                GeneticOperator::new(OperatorKind::RightChildMutation, 0.1),
                GeneticOperator::new(OperatorKind::Crossover, 0.5),
            ],
            hint: AddingRuleHint::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn with_selectors(mut self, selectors: Vec<Selector>) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_operators(mut self, operators: Vec<GeneticOperator>) -> Self {
        self.operators = operators;
        self
    }

    /// Sets the chance of every operator of the given kind.
    pub fn with_operator_chance(mut self, kind: OperatorKind, chance: f64) -> Self {
        for op in self.operators.iter_mut().filter(|op| op.kind == kind) {
            op.chance = chance.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_hint(mut self, hint: AddingRuleHint) -> Self {
        self.hint = hint;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.selectors.is_empty() {
            return Err("at least one selector is required".into());
        }
        for selector in &self.selectors {
            if let Selector::Tournament(0) = selector {
                return Err("tournament size must be at least 1".into());
            }
        }
        for op in &self.operators {
            if !(0.0..=1.0).contains(&op.chance) {
                return Err(format!("{:?} chance must lie in [0, 1]", op.kind));
            }
        }
        Ok(())
    }
}
