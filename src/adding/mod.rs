//! Rule insertion: the supervisor and its replacement strategies.
//!
//! Every rule entering a population, whether synthesized by coverage or
//! produced by evolution, passes through [`RuleAddingSupervisor::add_rule`].
//!
//! # References
//!
//! - De Jong (1975), *An Analysis of the Behavior of a Class of Genetic
//!   Adaptive Systems* (crowding)
//! - Unold (2008), "Context-free grammar induction with grammar-based
//!   classifier system"

mod config;
mod strategy;
mod supervisor;

pub use config::{CrowdingConfig, ElitismConfig};
pub use strategy::{elite_rules, AddOutcome, AddingRuleHint, AddingRuleStrategy};
pub use supervisor::RuleAddingSupervisor;
