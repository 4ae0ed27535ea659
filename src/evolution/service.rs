//! One evolutionary step per generation.

use rand::Rng;

use super::config::EvolutionConfig;
use super::operators::GeneticOperator;
use crate::adding::AddOutcome;
use crate::grammar::{Rule, RuleStore};
use crate::induction::GrammarState;

/// What one evolutionary step did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionReport {
    /// Rules picked by the selectors, in selector order.
    pub selected: Vec<Rule>,

    /// Rules leaving the last operator stage.
    pub offspring: Vec<Rule>,

    /// Offspring that grew the population.
    pub inserted: usize,

    /// Offspring that replaced an existing rule.
    pub replaced: usize,
}

/// Selection, variation and reinsertion of non-terminal rules.
#[derive(Debug, Clone)]
pub struct EvolutionService {
    config: EvolutionConfig,
    stages: Vec<GeneticOperator>,
}

impl EvolutionService {
    pub fn new(config: EvolutionConfig) -> Self {
        let mut stages = config.operators.clone();
        // stable: keeps configured order within an arity
        stages.sort_by_key(GeneticOperator::arity);
        Self { config, stages }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Operators in application order.
    pub fn stages(&self) -> &[GeneticOperator] {
        &self.stages
    }

    /// Runs one step: select, refresh the elite, apply the operator stages
    /// and submit every offspring with the configured hint.
    ///
    /// Reads the fitness memoized by the last
    /// [`update_fitness`](crate::stats::RuleStatistics::update_fitness).
    pub fn evolve<P: RuleStore, R: Rng>(&self, state: &mut GrammarState<P>, rng: &mut R) -> EvolutionReport {
        let candidates: Vec<Rule> = state.population.population().non_terminal_rules().copied().collect();
        if candidates.is_empty() {
            return EvolutionReport::default();
        }

        let selected: Vec<Rule> = self
            .config
            .selectors
            .iter()
            .filter_map(|s| s.select(&candidates, &state.statistics, rng))
            .collect();

        state.supervisor.refresh_elite(&state.population, &state.statistics);

        let mut offspring = selected.clone();
        for stage in &self.stages {
            offspring = stage.apply(&offspring, state.population.population(), rng);
        }

        let mut report = EvolutionReport {
            selected,
            offspring,
            ..EvolutionReport::default()
        };
        for &rule in &report.offspring {
            match state.add_rule(rule, self.config.hint, rng) {
                AddOutcome::Inserted => report.inserted += 1,
                AddOutcome::Replaced(_) => report.replaced += 1,
                AddOutcome::Existing => {}
            }
        }
        tracing::trace!(
            inserted = report.inserted,
            replaced = report.replaced,
            "evolution step"
        );
        report
    }
}
