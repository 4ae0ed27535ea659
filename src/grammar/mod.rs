//! Grammar model: symbols, sentences, CNF rules and rule populations.
//!
//! # Key Types
//!
//! - [`Sentence`]: labeled sequence of terminal symbols
//! - [`Rule`]: CNF rule, terminal when it has no right child
//! - [`RulePopulation`]: rules indexed by right-hand side
//! - [`StochasticRulePopulation`]: population with per-parent normalized
//!   probabilities
//! - [`RuleStore`]: common interface of both populations
//! - [`GrammarCorrector`]: non-productive / unreachable rule removal

mod config;
mod corrector;
mod population;
mod rule;
mod symbol;

pub use config::PopulationConfig;
pub use corrector::{CorrectionReport, GrammarCorrector};
pub use population::{RulePopulation, RuleStore, StochasticRulePopulation};
pub use rule::Rule;
pub use symbol::{is_non_terminal, is_terminal, Label, Sentence, Symbol, SymbolTable};
