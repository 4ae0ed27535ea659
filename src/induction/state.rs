//! Mutable state of one induction run.

use rand::Rng;

use crate::adding::{AddOutcome, AddingRuleHint, RuleAddingSupervisor};
use crate::grammar::{CorrectionReport, GrammarCorrector, Rule, RuleStore};
use crate::stats::{FitnessFunction, RuleStatistics};

/// Population, statistics and supervisor of one run, kept in lockstep.
///
/// Every rule insertion goes through [`GrammarState::add_rule`] so the
/// statistics always mirror the population.
#[derive(Debug, Clone)]
pub struct GrammarState<P> {
    pub population: P,
    pub statistics: RuleStatistics,
    pub supervisor: RuleAddingSupervisor,
}

impl<P: RuleStore> GrammarState<P> {
    /// Wraps a population, tracking all of its current rules.
    pub fn new(population: P, function: FitnessFunction, supervisor: RuleAddingSupervisor) -> Self {
        let statistics = RuleStatistics::for_rules(function, population.population().rules());
        Self {
            population,
            statistics,
            supervisor,
        }
    }

    /// Submits a rule to the supervisor.
    pub fn add_rule<R: Rng>(&mut self, rule: Rule, hint: AddingRuleHint, rng: &mut R) -> AddOutcome {
        self.supervisor
            .add_rule(rule, &mut self.population, &mut self.statistics, hint, rng)
    }

    /// Removes non-productive and unreachable rules.
    pub fn correct(&mut self) -> CorrectionReport {
        GrammarCorrector::correct_grammar(&mut self.population, &mut self.statistics)
    }

    pub fn rule_count(&self) -> usize {
        self.population.population().len()
    }
}
