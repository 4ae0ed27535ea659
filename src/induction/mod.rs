//! Grammar induction orchestration.
//!
//! # Key Types
//!
//! - [`InductionConfig`]: every component's configuration plus stop
//!   thresholds
//! - [`InductionRunner`]: the generation loop, with cancellation and
//!   multi-seed runs
//! - [`GrammarState`]: population, statistics and supervisor of one run
//! - [`StopCriterion`]: fitness, step and time predicates, checked in that
//!   order

mod config;
mod runner;
mod state;
mod stop;

pub use config::{InductionConfig, StopConfig};
pub use runner::{InductionResult, InductionRunner, PopulationFormatter};
pub use state::GrammarState;
pub use stop::{check, Progress, RunState, StopCriterion, StopReason};
