//! CYK parsing with on-demand coverage.
//!
//! # Key Types
//!
//! - [`Environment`]: triangular table of [`ProductionPool`] cells
//! - [`CykEngine`]: fills the table, invoking coverage operators where the
//!   grammar has gaps
//! - [`CoverageOperator`]: chance-gated rule synthesis (terminal, universal,
//!   starting, aggressive, full)
//! - [`Traceback`]: rules actually used by an accepted sentence
//! - [`CykExecutorSet`]: classic vs. stochastic variant wiring
//!
//! # References
//!
//! - Younger (1967), "Recognition and parsing of context-free languages in
//!   time n³"
//! - Unold (2005), "Context-free grammar induction with grammar-based
//!   classifier system"

mod coverage;
mod engine;
mod table;
mod traceback;

pub use coverage::{
    CoverageConfig, CoverageKind, CoverageOperator, CoverageOperatorConfig, CoverageOperators,
    CoverageSite,
};
pub use engine::{
    perform_probability_estimation, ClassicExecutors, CykEngine, CykExecutorSet, CykResult,
    StochasticExecutors,
};
pub use table::{Detector, Environment, Production, ProductionPool};
pub use traceback::Traceback;
