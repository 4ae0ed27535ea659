//! Single gateway for rule insertion.

use std::collections::BTreeSet;

use rand::Rng;

use super::config::{CrowdingConfig, ElitismConfig};
use super::strategy::{elite_rules, AddOutcome, AddingRuleHint, AddingRuleStrategy};
use crate::grammar::{Rule, RuleStore};
use crate::stats::RuleStatistics;

/// Routes every rule insertion, from coverage and evolution alike, to the
/// first installed strategy supporting the submission hint.
#[derive(Debug, Clone)]
pub struct RuleAddingSupervisor {
    strategies: Vec<AddingRuleStrategy>,
    elite: BTreeSet<Rule>,
}

impl RuleAddingSupervisor {
    pub fn new(strategies: Vec<AddingRuleStrategy>) -> Self {
        Self {
            strategies,
            elite: BTreeSet::new(),
        }
    }

    /// Supervisor with Simple, Crowding and Elitism installed.
    pub fn with_defaults(crowding: CrowdingConfig, elitism: ElitismConfig) -> Self {
        Self::new(vec![
            AddingRuleStrategy::Simple,
            AddingRuleStrategy::Crowding(crowding.clone()),
            AddingRuleStrategy::Elitism { crowding, elitism },
        ])
    }

    pub fn strategies(&self) -> &[AddingRuleStrategy] {
        &self.strategies
    }

    pub fn elite(&self) -> &BTreeSet<Rule> {
        &self.elite
    }

    fn elitism_config(&self) -> Option<&ElitismConfig> {
        self.strategies.iter().find_map(|s| match s {
            AddingRuleStrategy::Elitism { elitism, .. } => Some(elitism),
            _ => None,
        })
    }

    pub fn has_elitism(&self) -> bool {
        self.elitism_config().is_some()
    }

    /// Recomputes the elite set from current fitness. No-op without an
    /// elitism strategy.
    pub fn refresh_elite<P: RuleStore>(&mut self, population: &P, statistics: &RuleStatistics) {
        let Some(elitism) = self.elitism_config() else {
            return;
        };
        let elite = elite_rules(population, statistics, elitism);
        self.elite = elite;
    }

    /// Hint actually used for a submission: `ExpandPopulation` escalates to
    /// a size-controlling hint once the non-terminal cap is reached.
    pub fn effective_hint<P: RuleStore>(&self, population: &P, hint: AddingRuleHint) -> AddingRuleHint {
        let pop = population.population();
        if hint == AddingRuleHint::ExpandPopulation
            && pop.non_terminal_count() >= pop.max_non_terminal_rules()
        {
            if self.has_elitism() {
                AddingRuleHint::ControlPopulationSizeWithElitism
            } else {
                AddingRuleHint::ControlPopulationSize
            }
        } else {
            hint
        }
    }

    /// Submits a rule. No-op if the population already holds it.
    pub fn add_rule<P: RuleStore, R: Rng>(
        &mut self,
        rule: Rule,
        population: &mut P,
        statistics: &mut RuleStatistics,
        hint: AddingRuleHint,
        rng: &mut R,
    ) -> AddOutcome {
        if population.has_rule(&rule) {
            return AddOutcome::Existing;
        }

        let hint = self.effective_hint(population, hint);
        let Some(index) = self.strategies.iter().position(|s| s.supports(hint)) else {
            tracing::debug!(?hint, rule = %rule, "no strategy supports hint, inserting directly");
            return AddingRuleStrategy::Simple.apply(rule, population, statistics, &self.elite, rng);
        };

        if matches!(self.strategies[index], AddingRuleStrategy::Elitism { .. }) {
            self.refresh_elite(population, statistics);
        }
        self.strategies[index].apply(rule, population, statistics, &self.elite, rng)
    }
}
