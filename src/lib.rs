//! Grammar inference engine for context-free languages.
//!
//! Learns a grammar in Chomsky Normal Form from labeled example sentences
//! using a grammar-based classifier system:
//!
//! - **CYK parsing** ([`cyk`]): every sentence is parsed against the current
//!   rule population; coverage operators synthesize rules where the table
//!   has gaps.
//! - **Rule statistics** ([`stats`]): rules used by accepted sentences earn
//!   usage counts and fertility points that drive per-rule fitness.
//! - **Evolution** ([`evolution`]): a genetic algorithm selects, mutates and
//!   recombines rules each generation.
//! - **Rule adding** ([`adding`]): every new rule passes through one
//!   supervisor that keeps the population bounded via crowding and elitism.
//! - **Orchestration** ([`induction`]): the generation loop with fitness,
//!   step and time stop criteria.
//!
//! Two variants share the loop: the classic engine with exhaustive
//! traceback, and the stochastic engine whose rules carry per-parent
//! probabilities re-estimated after every pass.
//!
//! # Quick start
//!
//! ```
//! use gcs_induction::cyk::ClassicExecutors;
//! use gcs_induction::grammar::{Label, SymbolTable};
//! use gcs_induction::induction::{InductionConfig, InductionRunner, StopConfig};
//!
//! let mut table = SymbolTable::new();
//! table.intern_terminal("a");
//! table.intern_terminal("b");
//! let sentences = vec![
//!     table.sentence("a b", Label::Positive).unwrap(),
//!     table.sentence("a a b b", Label::Positive).unwrap(),
//!     table.sentence("b a", Label::Negative).unwrap(),
//! ];
//!
//! let config = InductionConfig::default()
//!     .with_stop(StopConfig::default().with_max_steps(10).with_satisfying_fitness(1.0))
//!     .with_seed(42);
//! let result = InductionRunner::run(&ClassicExecutors, &sentences, &config).unwrap();
//! assert!(result.generations >= 1);
//! ```
//!
//! # References
//!
//! - Unold (2008), "Context-free grammar induction with grammar-based
//!   classifier system"
//! - Unold & Kaczmarek (2011), "Stochastic grammar-based classifier system"

pub mod adding;
pub mod cyk;
pub mod error;
pub mod evolution;
pub mod grammar;
pub mod induction;
pub mod random;
pub mod stats;

pub use error::{Error, Result};
