//! Rule statistics and fitness.
//!
//! # Key Types
//!
//! - [`RuleStatistics`]: per-rule counters, incremental fertility extrema and
//!   memoized fitness
//! - [`FitnessFunction`]: Pasieka (usage count) or Classic (weighted blend)
//! - [`ConfusionMatrix`]: TP/TN/FP/FN estimator for one parse pass
//! - [`StatisticsSeries`]: per-generation criterion values with running
//!   global extrema

mod estimator;
mod fitness;
mod series;
mod statistics;

pub use estimator::{Classification, ConfusionMatrix};
pub use fitness::{ClassicFitness, FitnessFunction};
pub use series::{Criterion, CriterionValue, GenerationStats, StatisticsSeries};
pub use statistics::{FertilityExtrema, FitnessSummary, LeftSideInfo, RuleInfo, RuleStatistics};
