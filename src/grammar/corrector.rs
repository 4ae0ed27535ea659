//! Removal of non-productive and unreachable rules.
//!
//! Both passes compute a closure by fixed-point set expansion and then
//! remove every rule outside it, notifying the statistics of each removal.

use std::collections::BTreeSet;

use super::population::RuleStore;
use super::rule::Rule;
use super::symbol::Symbol;
use crate::stats::RuleStatistics;

/// Rules removed by one [`GrammarCorrector::correct_grammar`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    pub non_productive: Vec<Rule>,
    pub unreachable: Vec<Rule>,
}

impl CorrectionReport {
    pub fn removed(&self) -> usize {
        self.non_productive.len() + self.unreachable.len()
    }
}

/// Grammar cleanup passes.
pub struct GrammarCorrector;

impl GrammarCorrector {
    /// Removes non-productive rules, then unreachable rules.
    pub fn correct_grammar<P: RuleStore>(
        population: &mut P,
        statistics: &mut RuleStatistics,
    ) -> CorrectionReport {
        let non_productive = Self::remove_non_productive(population, statistics);
        let unreachable = Self::remove_unreachable(population, statistics);
        tracing::trace!(
            non_productive = non_productive.len(),
            unreachable = unreachable.len(),
            "grammar corrected"
        );
        CorrectionReport {
            non_productive,
            unreachable,
        }
    }

    /// Removes non-terminal rules that can never derive a terminal string.
    ///
    /// Productive symbols start as the parents of terminal rules plus the
    /// universal symbol, then grow by every rule whose children are both
    /// productive.
    pub fn remove_non_productive<P: RuleStore>(
        population: &mut P,
        statistics: &mut RuleStatistics,
    ) -> Vec<Rule> {
        let pop = population.population();
        let mut productive: BTreeSet<Symbol> = pop.terminal_rule_iter().map(Rule::parent).collect();
        productive.extend(pop.universal_symbol());

        let candidates: Vec<Rule> = pop.non_terminal_rules().copied().collect();
        let mut kept = vec![false; candidates.len()];
        loop {
            let mut changed = false;
            for (i, rule) in candidates.iter().enumerate() {
                if kept[i] {
                    continue;
                }
                let right_ok = rule.right().is_some_and(|r| productive.contains(&r));
                if productive.contains(&rule.left()) && right_ok {
                    kept[i] = true;
                    productive.insert(rule.parent());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let removed: Vec<Rule> = candidates
            .into_iter()
            .zip(kept)
            .filter(|(_, k)| !k)
            .map(|(r, _)| r)
            .collect();
        Self::remove_all(population, statistics, &removed);
        removed
    }

    /// Removes rules whose parent cannot be reached from the starting symbol.
    pub fn remove_unreachable<P: RuleStore>(
        population: &mut P,
        statistics: &mut RuleStatistics,
    ) -> Vec<Rule> {
        let pop = population.population();
        let mut reachable: BTreeSet<Symbol> = BTreeSet::from([pop.starting_symbol()]);
        let rules: Vec<Rule> = pop.rules().copied().collect();
        loop {
            let mut changed = false;
            for rule in &rules {
                if !reachable.contains(&rule.parent()) {
                    continue;
                }
                if let Some(right) = rule.right() {
                    changed |= reachable.insert(rule.left());
                    changed |= reachable.insert(right);
                }
            }
            if !changed {
                break;
            }
        }

        let removed: Vec<Rule> = rules
            .into_iter()
            .filter(|r| !reachable.contains(&r.parent()))
            .collect();
        Self::remove_all(population, statistics, &removed);
        removed
    }

    fn remove_all<P: RuleStore>(population: &mut P, statistics: &mut RuleStatistics, rules: &[Rule]) {
        for rule in rules {
            if population.remove_rule(rule) {
                statistics.remove_rule(rule);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{PopulationConfig, RulePopulation};
    use crate::stats::FitnessFunction;

    const S: Symbol = 1;
    const A: Symbol = 2;
    const B: Symbol = 3;
    const C: Symbol = 4;
    const D: Symbol = 5;

    fn setup(rules: &[Rule], config: PopulationConfig) -> (RulePopulation, RuleStatistics) {
        let pop = RulePopulation::from_rules(config, rules.iter().copied());
        let stats = RuleStatistics::for_rules(FitnessFunction::default(), pop.rules());
        (pop, stats)
    }

    #[test]
    fn test_removes_unreachable_rule() {
        let rules = [
            Rule::non_terminal(S, A, B),
            Rule::terminal(A, -1),
            Rule::terminal(B, -2),
            Rule::non_terminal(C, B, A),
            Rule::terminal(D, -3),
        ];
        let (mut pop, mut stats) = setup(&rules, PopulationConfig::default());
        let removed = GrammarCorrector::remove_unreachable(&mut pop, &mut stats);

        assert_eq!(removed.len(), 2);
        assert!(!pop.has_rule(&Rule::non_terminal(C, B, A)));
        assert!(!pop.has_rule(&Rule::terminal(D, -3)));
        for r in &rules[..3] {
            assert!(pop.has_rule(r), "reachable rule {r} was removed");
        }
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn test_removes_non_productive_rule() {
        let rules = [
            Rule::non_terminal(S, A, B),
            Rule::non_terminal(S, A, C),
            Rule::terminal(A, -1),
            Rule::terminal(B, -2),
            Rule::non_terminal(C, C, C),
        ];
        let (mut pop, mut stats) = setup(&rules, PopulationConfig::default());
        let removed = GrammarCorrector::remove_non_productive(&mut pop, &mut stats);

        assert_eq!(removed.len(), 2);
        assert!(pop.has_rule(&Rule::non_terminal(S, A, B)));
        assert!(!pop.has_rule(&Rule::non_terminal(S, A, C)));
        assert!(!pop.has_rule(&Rule::non_terminal(C, C, C)));
    }

    #[test]
    fn test_reachability_propagates_through_later_rules() {
        // D is only reachable through C, which is only reachable through S
        let rules = [
            Rule::non_terminal(D, A, A),
            Rule::non_terminal(C, D, B),
            Rule::non_terminal(S, C, B),
            Rule::terminal(A, -1),
            Rule::terminal(B, -2),
        ];
        let (mut pop, mut stats) = setup(&rules, PopulationConfig::default());
        let removed = GrammarCorrector::remove_unreachable(&mut pop, &mut stats);
        assert!(removed.is_empty());
        assert_eq!(pop.len(), 5);
    }

    #[test]
    fn test_productivity_propagates() {
        let rules = [
            Rule::non_terminal(S, C, C),
            Rule::non_terminal(C, A, A),
            Rule::terminal(A, -1),
        ];
        let (mut pop, mut stats) = setup(&rules, PopulationConfig::default());
        let removed = GrammarCorrector::remove_non_productive(&mut pop, &mut stats);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_universal_symbol_counts_as_productive() {
        let config = PopulationConfig::default().with_universal_symbol(D);
        let rules = [Rule::non_terminal(S, A, D), Rule::terminal(A, -1)];
        let (mut pop, mut stats) = setup(&rules, config);
        let removed = GrammarCorrector::remove_non_productive(&mut pop, &mut stats);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_correct_grammar_runs_both_passes() {
        let rules = [
            Rule::non_terminal(S, A, B),
            Rule::terminal(A, -1),
            Rule::terminal(B, -2),
            Rule::non_terminal(S, A, C),
            Rule::non_terminal(C, B, A),
        ];
        let (mut pop, mut stats) = setup(&rules, PopulationConfig::default());
        let report = GrammarCorrector::correct_grammar(&mut pop, &mut stats);
        // C -> B A is productive, and S -> A C too; all reachable
        assert_eq!(report.removed(), 0);

        pop.remove_rule(&Rule::non_terminal(S, A, C));
        stats.remove_rule(&Rule::non_terminal(S, A, C));
        let report = GrammarCorrector::correct_grammar(&mut pop, &mut stats);
        assert_eq!(report.unreachable, vec![Rule::non_terminal(C, B, A)]);
        assert_eq!(pop.len(), 3);
    }
}
