//! Genetic operators over non-terminal rules.
//!
//! # Unary operators
//!
//! - [`OperatorKind::Inversion`]: `A -> B C` becomes `A -> C B`
//! - [`OperatorKind::ParentMutation`]: fresh random parent
//! - [`OperatorKind::LeftChildMutation`]: fresh random left child
//! - [`OperatorKind::RightChildMutation`]: fresh random right child
//!
//! # Binary operators
//!
//! - [`OperatorKind::Crossover`]: `A -> B C`, `D -> E F` become
//!   `A -> E F`, `D -> B C`
//!
//! Terminal rules pass through every operator unchanged.

use rand::Rng;

use crate::grammar::{Rule, RulePopulation};
use crate::random::chance;

/// Which genetic operator this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorKind {
    Inversion,
    ParentMutation,
    LeftChildMutation,
    RightChildMutation,
    Crossover,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 5] = [
        OperatorKind::Inversion,
        OperatorKind::ParentMutation,
        OperatorKind::LeftChildMutation,
        OperatorKind::RightChildMutation,
        OperatorKind::Crossover,
    ];

    /// Number of rules the operator consumes per application.
    pub fn arity(&self) -> usize {
        match self {
            OperatorKind::Crossover => 2,
            _ => 1,
        }
    }
}

/// A chance-gated genetic operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneticOperator {
    pub kind: OperatorKind,

    /// Probability of applying the operator to each rule (or pair).
    pub chance: f64,
}

impl GeneticOperator {
    pub fn new(kind: OperatorKind, chance: f64) -> Self {
        Self {
            kind,
            chance: chance.clamp(0.0, 1.0),
        }
    }

    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    /// Applies the operator across `rules` and returns the next stage's
    /// input. The output has the same length and order as the input; rules
    /// the gate skipped pass through unchanged.
    ///
    /// Crossover pairs consecutive rules; an unpaired last rule passes
    /// through.
    pub fn apply<R: Rng>(&self, rules: &[Rule], population: &RulePopulation, rng: &mut R) -> Vec<Rule> {
        match self.kind {
            OperatorKind::Crossover => {
                let mut out = Vec::with_capacity(rules.len());
                for pair in rules.chunks(2) {
                    match pair {
                        [a, b] if chance(rng, self.chance) => {
                            let (x, y) = crossover(*a, *b);
                            out.push(x);
                            out.push(y);
                        }
                        _ => out.extend_from_slice(pair),
                    }
                }
                out
            }
            _ => rules
                .iter()
                .map(|&rule| {
                    if chance(rng, self.chance) {
                        self.mutate(rule, population, rng)
                    } else {
                        rule
                    }
                })
                .collect(),
        }
    }

    fn mutate<R: Rng>(&self, rule: Rule, population: &RulePopulation, rng: &mut R) -> Rule {
        let Some(right) = rule.right() else {
            return rule;
        };
        match self.kind {
            OperatorKind::Inversion => Rule::non_terminal(rule.parent(), right, rule.left()),
            OperatorKind::ParentMutation => rule.with_parent(population.random_non_terminal_symbol(rng)),
            OperatorKind::LeftChildMutation => rule.with_left(population.random_non_terminal_symbol(rng)),
            OperatorKind::RightChildMutation => rule.with_right(population.random_non_terminal_symbol(rng)),
            OperatorKind::Crossover => rule,
        }
    }
}

/// Swaps the right-hand sides of two non-terminal rules.
pub fn crossover(first: Rule, second: Rule) -> (Rule, Rule) {
    match (first.right(), second.right()) {
        (Some(r1), Some(r2)) => (
            Rule::non_terminal(first.parent(), second.left(), r2),
            Rule::non_terminal(second.parent(), first.left(), r1),
        ),
        _ => (first, second),
    }
}
