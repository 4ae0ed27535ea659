//! Induction configuration.
//!
//! [`InductionConfig`] nests every component's configuration plus the stop
//! thresholds of the orchestrator. The runner never mutates it.

use crate::adding::{CrowdingConfig, ElitismConfig};
use crate::cyk::CoverageConfig;
use crate::evolution::EvolutionConfig;
use crate::grammar::PopulationConfig;
use crate::stats::FitnessFunction;

/// Stop thresholds. At least one must be set for a run to start.
///
/// Checked before every generation, in the order fitness, steps, time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopConfig {
    /// Stop once the best grammar fitness reaches this value.
    pub satisfying_fitness: Option<f64>,

    /// Maximum number of generations.
    pub max_steps: Option<usize>,

    /// Wall-clock budget in seconds. Sampled at generation boundaries, so a
    /// run may overshoot by one generation.
    pub max_seconds: Option<f64>,
}

impl StopConfig {
    pub fn with_satisfying_fitness(mut self, fitness: f64) -> Self {
        self.satisfying_fitness = Some(fitness);
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_max_seconds(mut self, seconds: f64) -> Self {
        self.max_seconds = Some(seconds.max(0.0));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.satisfying_fitness.is_none() && self.max_steps.is_none() && self.max_seconds.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(seconds) = self.max_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err("max_seconds must be a non-negative number".into());
            }
        }
        if self.satisfying_fitness.is_some_and(f64::is_nan) {
            return Err("satisfying_fitness must not be NaN".into());
        }
        Ok(())
    }
}

/// Complete configuration of one induction run.
///
/// # Builder Pattern
///
/// ```
/// use gcs_induction::induction::{InductionConfig, StopConfig};
///
/// let config = InductionConfig::default()
///     .with_stop(StopConfig::default().with_max_steps(50).with_satisfying_fitness(1.0))
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InductionConfig {
    pub population: PopulationConfig,
    pub coverage: CoverageConfig,
    pub evolution: EvolutionConfig,
    pub crowding: CrowdingConfig,
    pub elitism: ElitismConfig,

    /// Rule fitness family; `None` uses the executor set's default.
    pub fitness: Option<FitnessFunction>,

    pub stop: StopConfig,

    /// Run the grammar corrector at the start of each generation.
    pub correction_enabled: bool,

    /// Run the evolutionary step after each parse pass.
    ///
    /// Disable for generalization-only runs.
    pub evolution_enabled: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for InductionConfig {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            coverage: CoverageConfig::default(),
            evolution: EvolutionConfig::default(),
            crowding: CrowdingConfig::default(),
            elitism: ElitismConfig::default(),
            fitness: None,
            stop: StopConfig::default().with_max_steps(100).with_satisfying_fitness(1.0),
            correction_enabled: true,
            evolution_enabled: true,
            seed: None,
        }
    }
}

impl InductionConfig {
    pub fn with_population(mut self, population: PopulationConfig) -> Self {
        self.population = population;
        self
    }

    pub fn with_coverage(mut self, coverage: CoverageConfig) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn with_evolution(mut self, evolution: EvolutionConfig) -> Self {
        self.evolution = evolution;
        self
    }

    pub fn with_crowding(mut self, crowding: CrowdingConfig) -> Self {
        self.crowding = crowding;
        self
    }

    pub fn with_elitism(mut self, elitism: ElitismConfig) -> Self {
        self.elitism = elitism;
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessFunction) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn with_stop(mut self, stop: StopConfig) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_correction(mut self, enabled: bool) -> Self {
        self.correction_enabled = enabled;
        self
    }

    pub fn with_evolution_enabled(mut self, enabled: bool) -> Self {
        self.evolution_enabled = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates every nested configuration.
    ///
    /// An empty [`StopConfig`] is not reported here; the runner rejects it
    /// with [`Error::NoStopCriterion`](crate::Error::NoStopCriterion).
    pub fn validate(&self) -> Result<(), String> {
        self.population.validate()?;
        self.coverage.validate()?;
        self.evolution.validate()?;
        self.crowding.validate()?;
        self.stop.validate()?;
        if let Some(fitness) = &self.fitness {
            fitness.validate()?;
        }
        if self.population.initial_non_terminal_rules > self.population.max_non_terminal_rules {
            return Err("initial_non_terminal_rules must not exceed max_non_terminal_rules".into());
        }
        Ok(())
    }
}
