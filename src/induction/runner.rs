//! Induction loop execution.
//!
//! [`InductionRunner`] drives one run:
//! stop check → correction → parse pass → fitness update → evolution → repeat.
//!
//! Correction starts with the second generation: before the first parse
//! pass a freshly seeded population has no terminal rules, so every seeded
//! rule would count as non-productive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::InductionConfig;
use super::state::GrammarState;
use super::stop::{check, Progress, RunState, StopCriterion, StopReason};
use crate::adding::RuleAddingSupervisor;
use crate::cyk::{CykEngine, CykExecutorSet};
use crate::error::{Error, Result};
use crate::evolution::EvolutionService;
use crate::grammar::{RulePopulation, RuleStore, Sentence};
use crate::random::rng_from_option;
use crate::stats::{ConfusionMatrix, RuleStatistics, StatisticsSeries};

/// Caller-supplied population printer, used only for debug logging.
pub type PopulationFormatter<'a> = &'a (dyn Fn(&RulePopulation) -> String + Sync);

/// Result of an induction run.
#[derive(Debug, Clone)]
pub struct InductionResult<P> {
    /// The final population.
    pub population: P,

    /// Rule statistics after the last parse pass.
    pub statistics: RuleStatistics,

    /// Per-generation statistics.
    pub series: StatisticsSeries,

    pub stop_reason: StopReason,

    /// Best grammar fitness over the run, `0.0` if no generation ran.
    pub best_fitness: f64,

    /// Number of generations executed.
    pub generations: usize,
}

/// Executes grammar induction.
///
/// # Usage
///
/// ```
/// use gcs_induction::cyk::ClassicExecutors;
/// use gcs_induction::grammar::Sentence;
/// use gcs_induction::induction::{InductionConfig, InductionRunner, StopConfig};
///
/// let sentences = vec![
///     Sentence::positive(vec![-1, -2]),
///     Sentence::negative(vec![-2, -1]),
/// ];
/// let config = InductionConfig::default()
///     .with_stop(StopConfig::default().with_max_steps(5))
///     .with_seed(42);
/// let result = InductionRunner::run(&ClassicExecutors, &sentences, &config).unwrap();
/// assert!(result.generations <= 5);
/// ```
pub struct InductionRunner;

impl InductionRunner {
    /// Runs induction from an empty population (plus the configured number
    /// of random initial rules).
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for an invalid configuration,
    /// [`Error::NoStopCriterion`] when no stop threshold is set.
    pub fn run<E: CykExecutorSet>(
        executors: &E,
        sentences: &[Sentence],
        config: &InductionConfig,
    ) -> Result<InductionResult<E::Population>> {
        Self::run_with_cancel(executors, sentences, config, None)
    }

    /// Runs induction with an optional cancellation token.
    ///
    /// If the flag is set, the run stops at the next generation boundary
    /// with [`StopReason::Cancelled`].
    pub fn run_with_cancel<E: CykExecutorSet>(
        executors: &E,
        sentences: &[Sentence],
        config: &InductionConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<InductionResult<E::Population>> {
        Self::run_from(executors, None, sentences, config, cancel, None)
    }

    /// Runs induction with full control: an optional imported starting
    /// population, a cancellation token and a population formatter whose
    /// output is logged after every generation.
    pub fn run_from<E: CykExecutorSet>(
        executors: &E,
        initial: Option<RulePopulation>,
        sentences: &[Sentence],
        config: &InductionConfig,
        cancel: Option<Arc<AtomicBool>>,
        formatter: Option<PopulationFormatter<'_>>,
    ) -> Result<InductionResult<E::Population>> {
        config
            .validate()
            .map_err(|message| Error::InvalidConfig { message })?;
        let criteria = StopCriterion::from_config(&config.stop);
        if criteria.is_empty() {
            return Err(Error::NoStopCriterion);
        }

        let mut rng = rng_from_option(config.seed);

        // Random seeding applies to fresh populations only; imports stay as given.
        let base = match initial {
            Some(population) => population,
            None => {
                let mut population = RulePopulation::new(config.population.clone());
                for _ in 0..config.population.initial_non_terminal_rules {
                    let rule = population.random_non_terminal_rule(&mut rng);
                    population.add_rule(rule);
                }
                population
            }
        };

        let function = config
            .fitness
            .clone()
            .unwrap_or_else(|| executors.default_fitness());
        let supervisor = RuleAddingSupervisor::with_defaults(config.crowding.clone(), config.elitism.clone());
        let mut state = GrammarState::new(executors.wrap(base), function, supervisor);

        let engine = CykEngine::new(&config.coverage);
        let evolution = EvolutionService::new(config.evolution.clone());
        let mut series = StatisticsSeries::new();
        let started = Instant::now();
        let mut step = 1usize;
        let mut run_state = RunState::Running;

        tracing::info!(
            sentences = sentences.len(),
            rules = state.rule_count(),
            seed = ?config.seed,
            "induction started"
        );

        while run_state.is_running() {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                run_state = RunState::Stopped(StopReason::Cancelled);
                continue;
            }
            let progress = Progress {
                step,
                best_fitness: series.best_fitness(),
                elapsed: started.elapsed(),
            };
            if let Some(reason) = check(&criteria, &progress) {
                run_state = RunState::Stopped(reason);
                continue;
            }

            if config.correction_enabled && step > 1 {
                let report = state.correct();
                if report.removed() > 0 {
                    tracing::trace!(step, removed = report.removed(), "grammar corrected");
                }
            }

            state.statistics.reset_usage();
            let mut confusion = ConfusionMatrix::default();
            for sentence in sentences {
                let result = engine.parse(sentence, &mut state, &mut rng)?;
                if let Some(classification) = result.classification {
                    confusion.record(classification);
                }
                executors.record_usage(&result, &mut state)?;
            }
            state.statistics.update_fitness();
            executors.after_pass(&mut state.population, &state.statistics);

            let generation = series.record(
                step,
                confusion,
                state.statistics.summary(),
                state.rule_count(),
                state.population.population().non_terminal_count(),
            );
            tracing::debug!(
                step,
                fitness = generation.fitness(),
                rules = generation.rule_count,
                "generation finished"
            );
            if let Some(print) = formatter {
                tracing::debug!(step, population = %print(state.population.population()), "population");
            }

            if config.evolution_enabled {
                evolution.evolve(&mut state, &mut rng);
            }
            step += 1;
        }

        let stop_reason = match run_state {
            RunState::Stopped(reason) => reason,
            RunState::Running => StopReason::Cancelled,
        };
        let best_fitness = series.best_fitness().unwrap_or(0.0);
        tracing::info!(
            ?stop_reason,
            best_fitness,
            generations = series.len(),
            rules = state.rule_count(),
            "induction stopped"
        );

        Ok(InductionResult {
            population: state.population,
            statistics: state.statistics,
            generations: series.len(),
            series,
            stop_reason,
            best_fitness,
        })
    }

    /// Runs one independent induction per seed.
    ///
    /// With the `parallel` feature the runs execute concurrently on the
    /// rayon pool. Each run owns its population, statistics and generator.
    pub fn run_many<E>(
        executors: &E,
        sentences: &[Sentence],
        config: &InductionConfig,
        seeds: &[u64],
    ) -> Vec<Result<InductionResult<E::Population>>>
    where
        E: CykExecutorSet + Sync,
    {
        let run = |&seed: &u64| {
            let config = config.clone().with_seed(seed);
            Self::run(executors, sentences, &config)
        };
        #[cfg(feature = "parallel")]
        {
            seeds.par_iter().map(run).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            seeds.iter().map(run).collect()
        }
    }

    /// Classifies `sentences` against a fixed grammar, without coverage or
    /// evolution. Sentences with an unknown label are not counted.
    pub fn evaluate<P: RuleStore>(population: &P, sentences: &[Sentence]) -> Result<ConfusionMatrix> {
        let mut confusion = ConfusionMatrix::default();
        for sentence in sentences {
            if let Some(c) = CykEngine::classify(population, sentence)?.classification {
                confusion.record(c);
            }
        }
        Ok(confusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cyk::{ClassicExecutors, CoverageConfig, StochasticExecutors};
    use crate::grammar::{PopulationConfig, Rule, Symbol};
    use crate::induction::StopConfig;
    use crate::stats::Criterion;

    const A: Symbol = -1;
    const B: Symbol = -2;

    /// a^n b^n against a few near misses.
    fn anbn() -> Vec<Sentence> {
        let word = |n: usize, m: usize| {
            let mut s = vec![A; n];
            s.extend(vec![B; m]);
            s
        };
        vec![
            Sentence::positive(word(1, 1)),
            Sentence::positive(word(2, 2)),
            Sentence::positive(word(3, 3)),
            Sentence::negative(word(2, 1)),
            Sentence::negative(word(1, 2)),
            Sentence::negative(vec![B, A]),
            Sentence::negative(vec![A, A]),
        ]
    }

    fn config(stop: StopConfig) -> InductionConfig {
        InductionConfig::default()
            .with_population(
                PopulationConfig::default()
                    .with_max_non_terminal_symbols(6)
                    .with_max_non_terminal_rules(40),
            )
            .with_stop(stop)
            .with_seed(42)
    }

    #[test]
    fn test_fitness_criterion_takes_priority() {
        let stop = StopConfig::default()
            .with_satisfying_fitness(0.0)
            .with_max_steps(100);
        let result = InductionRunner::run(&ClassicExecutors, &anbn(), &config(stop)).unwrap();
        assert_eq!(result.stop_reason, StopReason::StoppedByFitness);
        assert_eq!(result.generations, 1);
    }

    #[test]
    fn test_step_limit() {
        let stop = StopConfig::default().with_max_steps(3);
        let result = InductionRunner::run(&ClassicExecutors, &anbn(), &config(stop)).unwrap();
        assert_eq!(result.stop_reason, StopReason::StoppedByStepLimit);
        assert_eq!(result.generations, 3);
        assert_eq!(result.series.len(), 3);
    }

    #[test]
    fn test_time_limit() {
        let stop = StopConfig::default().with_max_seconds(0.0);
        let result = InductionRunner::run(&ClassicExecutors, &anbn(), &config(stop)).unwrap();
        assert_eq!(result.stop_reason, StopReason::StoppedByTimeLimit);
        assert!(result.generations <= 1);
    }

    #[test]
    fn test_no_stop_criterion() {
        let err = InductionRunner::run(&ClassicExecutors, &anbn(), &config(StopConfig::default())).unwrap_err();
        assert_eq!(err, Error::NoStopCriterion);
    }

    #[test]
    fn test_invalid_config() {
        let config = config(StopConfig::default().with_max_steps(1))
            .with_population(PopulationConfig::default().with_max_non_terminal_rules(0));
        let err = InductionRunner::run(&ClassicExecutors, &anbn(), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_cancel_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let stop = StopConfig::default().with_max_steps(10);
        let result =
            InductionRunner::run_with_cancel(&ClassicExecutors, &anbn(), &config(stop), Some(flag)).unwrap();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.best_fitness, 0.0);
    }

    #[test]
    fn test_coverage_learns_positive_examples() {
        let stop = StopConfig::default().with_max_steps(1);
        let config = config(stop).with_evolution_enabled(false).with_correction(false);
        let result = InductionRunner::run(&ClassicExecutors, &anbn(), &config).unwrap();

        // full coverage makes every positive sentence parse on its first pass
        let confusion = result.series.last().unwrap().confusion;
        assert_eq!(confusion.true_positives, 3);
        assert!(result.population.population().terminal_rules(A).is_some());
        assert!(result.population.population().terminal_rules(B).is_some());
        assert_eq!(result.statistics.len(), result.population.population().len());
    }

    #[test]
    fn test_seeded_rules_reach_first_parse_pass() {
        let config = InductionConfig::default()
            .with_population(
                PopulationConfig::default()
                    .with_max_non_terminal_symbols(4)
                    .with_initial_non_terminal_rules(5),
            )
            .with_coverage(CoverageConfig::disabled())
            .with_evolution_enabled(false)
            .with_stop(StopConfig::default().with_max_steps(1))
            .with_seed(8);
        assert!(config.correction_enabled);
        let result = InductionRunner::run(&ClassicExecutors, &anbn(), &config).unwrap();

        let seeded = result.population.non_terminal_count();
        assert!(seeded > 0);
        assert_eq!(result.series.last().unwrap().rule_count, seeded);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let stop = StopConfig::default().with_max_steps(5);
        let a = InductionRunner::run(&ClassicExecutors, &anbn(), &config(stop.clone())).unwrap();
        let b = InductionRunner::run(&ClassicExecutors, &anbn(), &config(stop)).unwrap();
        assert_eq!(a.population.to_rules(), b.population.to_rules());
        assert_eq!(a.series, b.series);
    }

    #[test]
    fn test_stochastic_variant_keeps_groups_normalized() {
        let stop = StopConfig::default().with_max_steps(4);
        let result = InductionRunner::run(&StochasticExecutors, &anbn(), &config(stop)).unwrap();
        let parents: std::collections::BTreeSet<Symbol> =
            result.population.population().rules().map(Rule::parent).collect();
        for parent in parents {
            let sum = result.population.parent_probability_sum(parent);
            assert!((sum - 1.0).abs() < 1e-9, "parent {parent} sums to {sum}");
        }
    }

    #[test]
    fn test_imported_population_and_evaluate() {
        let grammar = RulePopulation::from_rules(
            PopulationConfig::default(),
            [
                Rule::non_terminal(1, 2, 3),
                Rule::non_terminal(1, 2, 4),
                Rule::non_terminal(4, 1, 3),
                Rule::terminal(2, A),
                Rule::terminal(3, B),
            ],
        );
        let confusion = InductionRunner::evaluate(&grammar, &anbn()).unwrap();
        assert_eq!(confusion.accuracy(), 1.0);

        let stop = StopConfig::default().with_satisfying_fitness(1.0).with_max_steps(10);
        let config = InductionConfig::default().with_stop(stop).with_seed(1);
        let formatter = |p: &RulePopulation| format!("{} rules", p.len());
        let result = InductionRunner::run_from(
            &ClassicExecutors,
            Some(grammar),
            &anbn(),
            &config,
            None,
            Some(&formatter),
        )
        .unwrap();
        assert_eq!(result.stop_reason, StopReason::StoppedByFitness);
        assert_eq!(result.generations, 1);
        assert_eq!(result.series.global_max(Criterion::Fitness), Some(1.0));
    }

    #[test]
    fn test_run_many_independent_seeds() {
        let stop = StopConfig::default().with_max_steps(2);
        let results = InductionRunner::run_many(&ClassicExecutors, &anbn(), &config(stop), &[1, 2, 3]);
        assert_eq!(results.len(), 3);
        for result in results {
            assert_eq!(result.unwrap().generations, 2);
        }
    }
}
