//! Stop criteria and run states.

use std::time::Duration;

use super::config::StopConfig;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    StoppedByFitness,
    StoppedByStepLimit,
    StoppedByTimeLimit,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped(StopReason),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Snapshot read by the stop criteria before each generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Number of the generation about to run (1-based).
    pub step: usize,

    /// Best grammar fitness so far, `None` before the first generation.
    pub best_fitness: Option<f64>,

    pub elapsed: Duration,
}

/// A single stop predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCriterion {
    /// Best fitness reached the threshold.
    Fitness(f64),
    /// More than the given number of generations would run.
    Step(usize),
    /// Elapsed wall time exceeds the budget.
    Time(Duration),
}

impl StopCriterion {
    /// Criteria installed by a configuration, in priority order.
    pub fn from_config(config: &StopConfig) -> Vec<StopCriterion> {
        let mut criteria = Vec::with_capacity(3);
        if let Some(fitness) = config.satisfying_fitness {
            criteria.push(StopCriterion::Fitness(fitness));
        }
        if let Some(steps) = config.max_steps {
            criteria.push(StopCriterion::Step(steps));
        }
        if let Some(seconds) = config.max_seconds {
            criteria.push(StopCriterion::Time(
                Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO),
            ));
        }
        criteria
    }

    pub fn is_satisfied(&self, progress: &Progress) -> bool {
        match *self {
            StopCriterion::Fitness(threshold) => progress.best_fitness.is_some_and(|f| f >= threshold),
            StopCriterion::Step(max) => progress.step > max,
            StopCriterion::Time(budget) => progress.elapsed > budget,
        }
    }

    pub fn reason(&self) -> StopReason {
        match self {
            StopCriterion::Fitness(_) => StopReason::StoppedByFitness,
            StopCriterion::Step(_) => StopReason::StoppedByStepLimit,
            StopCriterion::Time(_) => StopReason::StoppedByTimeLimit,
        }
    }
}

/// Evaluates `criteria` in order and returns the reason of the first one
/// satisfied.
pub fn check(criteria: &[StopCriterion], progress: &Progress) -> Option<StopReason> {
    criteria
        .iter()
        .find(|c| c.is_satisfied(progress))
        .map(StopCriterion::reason)
}
