//! Genetic algorithm over grammar rules.
//!
//! Each generation, [`EvolutionService::evolve`] picks rules with the
//! configured [`Selector`]s, runs them through the [`GeneticOperator`]
//! stages and submits the offspring to the rule-adding supervisor.
//!
//! # Key Types
//!
//! - [`EvolutionConfig`]: selectors, operator chances, submission hint
//! - [`Selector`]: random, tournament, roulette, rank
//! - [`GeneticOperator`]: inversion, three mutations, crossover
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Unold (2008), "Context-free grammar induction with grammar-based
//!   classifier system"

mod config;
mod operators;
mod selection;
mod service;

pub use config::EvolutionConfig;
pub use operators::{crossover, GeneticOperator, OperatorKind};
pub use selection::Selector;
pub use service::{EvolutionReport, EvolutionService};
