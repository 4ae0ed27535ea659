//! Rule insertion strategies.
//!
//! - **Simple**: unconditional insert.
//! - **Crowding**: replace the weak rule most similar to the newcomer,
//!   keeping the population size constant (De Jong, 1975).
//! - **Elitism**: crowding that never evicts the current elite.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::{CrowdingConfig, ElitismConfig};
use crate::grammar::{Rule, RuleStore};
use crate::random::sample_indices;
use crate::stats::RuleStatistics;

/// Intent attached to a rule submission, used to pick a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddingRuleHint {
    /// Grow the population.
    ExpandPopulation,
    /// Keep the population size constant via crowding.
    ControlPopulationSize,
    /// Crowding that protects elite rules.
    #[default]
    ControlPopulationSizeWithElitism,
}

/// What an insertion did to the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The rule already existed; nothing changed.
    Existing,
    /// The rule was inserted; the population grew by one.
    Inserted,
    /// The rule replaced the given rule.
    Replaced(Rule),
}

/// A rule insertion strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum AddingRuleStrategy {
    Simple,
    Crowding(CrowdingConfig),
    Elitism {
        crowding: CrowdingConfig,
        elitism: ElitismConfig,
    },
}

impl AddingRuleStrategy {
    /// Returns `true` if this strategy handles the given hint.
    pub fn supports(&self, hint: AddingRuleHint) -> bool {
        matches!(
            (self, hint),
            (AddingRuleStrategy::Simple, AddingRuleHint::ExpandPopulation)
                | (
                    AddingRuleStrategy::Crowding(_),
                    AddingRuleHint::ControlPopulationSize
                )
                | (
                    AddingRuleStrategy::Elitism { .. },
                    AddingRuleHint::ControlPopulationSizeWithElitism
                )
        )
    }

    /// Inserts `rule`, which must not already be in the population.
    ///
    /// `elite` lists the rules crowding may not evict. A rule whose index
    /// key is held by another parent overwrites that rule instead, without
    /// crowding, since the population size does not change.
    pub fn apply<P: RuleStore, R: Rng>(
        &self,
        rule: Rule,
        population: &mut P,
        statistics: &mut RuleStatistics,
        elite: &BTreeSet<Rule>,
        rng: &mut R,
    ) -> AddOutcome {
        if let Some(old) = population.population().displaced_by(&rule) {
            population.remove_rule(&old);
            statistics.remove_rule(&old);
            population.add_rule(rule);
            statistics.add_rule(rule);
            tracing::trace!(old = %old, new = %rule, "key overwrite");
            return AddOutcome::Replaced(old);
        }

        let replaced = match self {
            AddingRuleStrategy::Simple => None,
            AddingRuleStrategy::Crowding(crowding) => {
                crowding_victim(&rule, population, statistics, crowding, &BTreeSet::new(), rng)
            }
            AddingRuleStrategy::Elitism { crowding, .. } => {
                crowding_victim(&rule, population, statistics, crowding, elite, rng)
            }
        };

        if let Some(old) = replaced {
            population.remove_rule(&old);
            statistics.remove_rule(&old);
            tracing::trace!(old = %old, new = %rule, "crowding replacement");
        }
        population.add_rule(rule);
        statistics.add_rule(rule);

        match replaced {
            Some(old) => AddOutcome::Replaced(old),
            None => AddOutcome::Inserted,
        }
    }
}

/// Top `size` non-terminal rules by current fitness.
pub fn elite_rules<P: RuleStore>(
    population: &P,
    statistics: &RuleStatistics,
    elitism: &ElitismConfig,
) -> BTreeSet<Rule> {
    let mut ranked: Vec<(Rule, f64)> = population
        .population()
        .non_terminal_rules()
        .map(|r| (*r, statistics.fitness(r)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().take(elitism.size).map(|(r, _)| r).collect()
}

/// Picks the rule crowding evicts for `rule`, or `None` if no same-arity,
/// non-elite rule exists.
///
/// Each of `factor` rounds draws `size` rules, shuffles them and keeps the
/// first worst by fitness. Among those weak rules, the one with the highest
/// affinity to `rule` is chosen; ties go to the earliest drawn.
fn crowding_victim<P: RuleStore, R: Rng>(
    rule: &Rule,
    population: &P,
    statistics: &RuleStatistics,
    crowding: &CrowdingConfig,
    elite: &BTreeSet<Rule>,
    rng: &mut R,
) -> Option<Rule> {
    let pop = population.population();
    let candidates: Vec<Rule> = if rule.is_terminal() {
        pop.terminal_rule_iter().copied().collect()
    } else {
        pop.non_terminal_rules().copied().collect()
    };
    let candidates: Vec<Rule> = candidates.into_iter().filter(|r| !elite.contains(r)).collect();
    if candidates.is_empty() {
        return None;
    }

    let mut weak = Vec::with_capacity(crowding.factor);
    for _ in 0..crowding.factor {
        let mut sample: Vec<Rule> = sample_indices(rng, candidates.len(), crowding.size)
            .into_iter()
            .map(|i| candidates[i])
            .collect();
        sample.shuffle(rng);
        let worst = sample.into_iter().min_by(|a, b| {
            statistics
                .fitness(a)
                .partial_cmp(&statistics.fitness(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        weak.extend(worst);
    }

    let mut best: Option<(Rule, i32)> = None;
    for candidate in weak {
        let affinity = rule.affinity(&candidate);
        if affinity < 0 {
            continue;
        }
        if best.is_none_or(|(_, a)| affinity > a) {
            best = Some((candidate, affinity));
        }
    }
    best.map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{PopulationConfig, RulePopulation};
    use crate::random::create_rng;
    use crate::stats::{FitnessFunction, RuleStatistics};

    fn setup(rules: &[Rule]) -> (RulePopulation, RuleStatistics) {
        let pop = RulePopulation::from_rules(PopulationConfig::default(), rules.iter().copied());
        let stats = RuleStatistics::for_rules(FitnessFunction::Pasieka, pop.rules());
        (pop, stats)
    }

    #[test]
    fn test_supports() {
        let crowding = AddingRuleStrategy::Crowding(CrowdingConfig::default());
        assert!(AddingRuleStrategy::Simple.supports(AddingRuleHint::ExpandPopulation));
        assert!(!AddingRuleStrategy::Simple.supports(AddingRuleHint::ControlPopulationSize));
        assert!(crowding.supports(AddingRuleHint::ControlPopulationSize));
        assert!(!crowding.supports(AddingRuleHint::ControlPopulationSizeWithElitism));
    }

    #[test]
    fn test_simple_grows_population() {
        let (mut pop, mut stats) = setup(&[Rule::non_terminal(1, 2, 3)]);
        let mut rng = create_rng(1);
        let outcome = AddingRuleStrategy::Simple.apply(
            Rule::non_terminal(2, 3, 4),
            &mut pop,
            &mut stats,
            &BTreeSet::new(),
            &mut rng,
        );
        assert_eq!(outcome, AddOutcome::Inserted);
        assert_eq!(pop.len(), 2);
        assert!(stats.tracks(&Rule::non_terminal(2, 3, 4)));
    }

    #[test]
    fn test_crowding_preserves_size() {
        let rules: Vec<Rule> = (1..=10).map(|i| Rule::non_terminal(i, i, i)).collect();
        let (mut pop, mut stats) = setup(&rules);
        let mut rng = create_rng(42);
        let strategy = AddingRuleStrategy::Crowding(CrowdingConfig::new(3, 4));
        for i in 11..30 {
            let new = Rule::non_terminal(i % 20 + 1, i, 1);
            if pop.has_rule(&new) {
                continue;
            }
            let outcome = strategy.apply(new, &mut pop, &mut stats, &BTreeSet::new(), &mut rng);
            assert!(matches!(outcome, AddOutcome::Replaced(_)));
            assert_eq!(pop.non_terminal_count(), 10);
            assert_eq!(stats.len(), 10);
        }
    }

    #[test]
    fn test_taken_key_overwrites_without_crowding() {
        let rules = [Rule::non_terminal(1, 2, 3), Rule::non_terminal(4, 5, 6)];
        let (mut pop, mut stats) = setup(&rules);
        let mut rng = create_rng(5);
        let strategy = AddingRuleStrategy::Crowding(CrowdingConfig::new(60, 2));
        let new = Rule::non_terminal(7, 2, 3);
        let outcome = strategy.apply(new, &mut pop, &mut stats, &BTreeSet::new(), &mut rng);

        assert_eq!(outcome, AddOutcome::Replaced(rules[0]));
        assert!(pop.has_rule(&rules[1]));
        assert!(!stats.tracks(&rules[0]));
        assert_eq!(pop.len(), 2);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_crowding_prefers_similar_weak_rule() {
        // sample covers the whole population, so every rule is weak
        // (all unused), and the most similar one is evicted
        let rules = [
            Rule::non_terminal(1, 2, 3),
            Rule::non_terminal(4, 5, 6),
            Rule::non_terminal(7, 8, 9),
        ];
        let (mut pop, mut stats) = setup(&rules);
        let mut rng = create_rng(7);
        let strategy = AddingRuleStrategy::Crowding(CrowdingConfig::new(60, 1));
        let outcome = strategy.apply(
            Rule::non_terminal(4, 5, 10),
            &mut pop,
            &mut stats,
            &BTreeSet::new(),
            &mut rng,
        );
        assert_eq!(outcome, AddOutcome::Replaced(Rule::non_terminal(4, 5, 6)));
    }

    #[test]
    fn test_crowding_only_replaces_same_arity() {
        let (mut pop, mut stats) = setup(&[Rule::non_terminal(1, 2, 3)]);
        let mut rng = create_rng(3);
        let strategy = AddingRuleStrategy::Crowding(CrowdingConfig::default());
        let outcome = strategy.apply(
            Rule::terminal(2, -1),
            &mut pop,
            &mut stats,
            &BTreeSet::new(),
            &mut rng,
        );
        assert_eq!(outcome, AddOutcome::Inserted);
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_elitism_protects_elite() {
        let rules = [Rule::non_terminal(1, 2, 3), Rule::non_terminal(4, 5, 6)];
        let (mut pop, mut stats) = setup(&rules);
        stats.record_usage(&rules[0], crate::grammar::Label::Positive);
        stats.update_fitness();

        let elitism = ElitismConfig::new(1);
        let elite = elite_rules(&pop, &stats, &elitism);
        assert_eq!(elite, BTreeSet::from([rules[0]]));

        let strategy = AddingRuleStrategy::Elitism {
            crowding: CrowdingConfig::new(5, 2),
            elitism,
        };
        let mut rng = create_rng(11);
        let outcome = strategy.apply(Rule::non_terminal(1, 2, 4), &mut pop, &mut stats, &elite, &mut rng);
        assert_eq!(outcome, AddOutcome::Replaced(rules[1]));
        assert!(pop.has_rule(&rules[0]));
    }
}
