//! Rule population storage.
//!
//! [`RulePopulation`] keeps every rule in exactly one of two indexes:
//! non-terminal rules by their right-hand side pair, terminal rules by the
//! terminal they derive. Each key holds one rule: adding a rule whose key is
//! taken by a different parent overwrites the stored rule (last write wins).
//!
//! [`StochasticRulePopulation`] wraps a population and adds per-rule
//! probabilities, renormalized per parent symbol after every change.

use std::collections::BTreeMap;

use rand::Rng;

use super::config::PopulationConfig;
use super::rule::Rule;
use super::symbol::Symbol;
use crate::error::{Error, Result};

/// Read/write access to a rule population, shared by the classic and the
/// stochastic variant.
///
/// The CYK engine, the supervisor and the corrector only talk to this trait.
pub trait RuleStore {
    /// The underlying dual-indexed population.
    fn population(&self) -> &RulePopulation;

    /// Inserts a rule, overwriting any rule stored under the same key.
    /// Returns `true` if it was not present before.
    fn add_rule(&mut self, rule: Rule) -> bool;

    /// Removes a rule. Returns `true` if it was present.
    fn remove_rule(&mut self, rule: &Rule) -> bool;

    /// Probability of a rule. Non-stochastic populations report `1.0`.
    fn probability(&self, _rule: &Rule) -> f64 {
        1.0
    }

    fn has_rule(&self, rule: &Rule) -> bool {
        self.population().has_rule(rule)
    }
}

/// Dual-indexed store of CNF rules.
#[derive(Debug, Clone)]
pub struct RulePopulation {
    rules_by_right: BTreeMap<(Symbol, Symbol), Rule>,
    terminal_rules: BTreeMap<Symbol, Rule>,
    non_terminal_count: usize,
    terminal_count: usize,
    config: PopulationConfig,
}

impl RulePopulation {
    pub fn new(config: PopulationConfig) -> Self {
        Self {
            rules_by_right: BTreeMap::new(),
            terminal_rules: BTreeMap::new(),
            non_terminal_count: 0,
            terminal_count: 0,
            config,
        }
    }

    /// Builds a population from a flat rule list (population import).
    pub fn from_rules<I: IntoIterator<Item = Rule>>(config: PopulationConfig, rules: I) -> Self {
        let mut population = Self::new(config);
        for rule in rules {
            population.insert(rule);
        }
        population
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn starting_symbol(&self) -> Symbol {
        self.config.starting_symbol
    }

    pub fn universal_symbol(&self) -> Option<Symbol> {
        self.config.universal_symbol
    }

    pub fn max_non_terminal_symbols(&self) -> Symbol {
        self.config.max_non_terminal_symbols
    }

    pub fn max_non_terminal_rules(&self) -> usize {
        self.config.max_non_terminal_rules
    }

    fn insert(&mut self, rule: Rule) -> bool {
        // An equal key overwrites the stored rule, whatever its parent.
        let previous = match rule.right() {
            Some(right) => self.rules_by_right.insert((rule.left(), right), rule),
            None => self.terminal_rules.insert(rule.left(), rule),
        };
        if let Some(old) = previous {
            return old != rule;
        }
        if rule.is_terminal() {
            self.terminal_count += 1;
        } else {
            self.non_terminal_count += 1;
        }
        true
    }

    fn delete(&mut self, rule: &Rule) -> bool {
        let removed = match rule.right() {
            Some(right) => remove_from(&mut self.rules_by_right, (rule.left(), right), rule),
            None => remove_from(&mut self.terminal_rules, rule.left(), rule),
        };
        if removed {
            if rule.is_terminal() {
                self.terminal_count -= 1;
            } else {
                self.non_terminal_count -= 1;
            }
        }
        removed
    }

    fn stored_at(&self, rule: &Rule) -> Option<&Rule> {
        match rule.right() {
            Some(right) => self.rules_by_right.get(&(rule.left(), right)),
            None => self.terminal_rules.get(&rule.left()),
        }
    }

    pub fn has_rule(&self, rule: &Rule) -> bool {
        self.stored_at(rule) == Some(rule)
    }

    /// The stored rule that adding `rule` would overwrite: same key,
    /// different parent.
    pub fn displaced_by(&self, rule: &Rule) -> Option<Rule> {
        self.stored_at(rule).filter(|stored| *stored != rule).copied()
    }

    /// Looks up non-terminal rules by their right-hand side.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArity`] unless `rhs` holds exactly two symbols.
    pub fn rules_by_right(&self, rhs: &[Symbol]) -> Result<Option<&Rule>> {
        match rhs {
            [left, right] => Ok(self.rules_by_pair(*left, *right)),
            _ => Err(Error::InvalidArity { actual: rhs.len() }),
        }
    }

    /// The non-terminal rule deriving `left right`.
    pub fn rules_by_pair(&self, left: Symbol, right: Symbol) -> Option<&Rule> {
        self.rules_by_right.get(&(left, right))
    }

    /// The terminal rule deriving `terminal`.
    pub fn terminal_rules(&self, terminal: Symbol) -> Option<&Rule> {
        self.terminal_rules.get(&terminal)
    }

    pub fn non_terminal_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules_by_right.values()
    }

    pub fn terminal_rule_iter(&self) -> impl Iterator<Item = &Rule> {
        self.terminal_rules.values()
    }

    /// Every rule, non-terminal rules first.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.non_terminal_rules().chain(self.terminal_rule_iter())
    }

    /// Flat rule list (population export).
    pub fn to_rules(&self) -> Vec<Rule> {
        self.rules().copied().collect()
    }

    pub fn non_terminal_count(&self) -> usize {
        self.non_terminal_count
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    pub fn len(&self) -> usize {
        self.non_terminal_count + self.terminal_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draws a non-terminal symbol uniformly from `[1, max_non_terminal_symbols]`.
    pub fn random_non_terminal_symbol<R: Rng>(&self, rng: &mut R) -> Symbol {
        rng.random_range(1..=self.config.max_non_terminal_symbols.max(1))
    }

    /// Draws a random non-terminal rule over the configured symbol range.
    pub fn random_non_terminal_rule<R: Rng>(&self, rng: &mut R) -> Rule {
        Rule::non_terminal(
            self.random_non_terminal_symbol(rng),
            self.random_non_terminal_symbol(rng),
            self.random_non_terminal_symbol(rng),
        )
    }
}

fn remove_from<K: Ord>(index: &mut BTreeMap<K, Rule>, key: K, rule: &Rule) -> bool {
    if index.get(&key) != Some(rule) {
        return false;
    }
    index.remove(&key);
    true
}

impl RuleStore for RulePopulation {
    fn population(&self) -> &RulePopulation {
        self
    }

    fn add_rule(&mut self, rule: Rule) -> bool {
        self.insert(rule)
    }

    fn remove_rule(&mut self, rule: &Rule) -> bool {
        self.delete(rule)
    }
}

/// A population whose rules carry probabilities.
///
/// Raw weights are stored per rule; the probability of a rule is its weight
/// divided by the summed weight of all rules sharing its parent, so every
/// parent group sums to `1.0` after each add and remove.
#[derive(Debug, Clone)]
pub struct StochasticRulePopulation {
    inner: RulePopulation,
    weights: BTreeMap<Rule, f64>,
    probability: BTreeMap<Rule, f64>,
}

impl StochasticRulePopulation {
    pub fn new(config: PopulationConfig) -> Self {
        Self::from_population(RulePopulation::new(config))
    }

    /// Wraps an existing population with uniform weights per parent.
    pub fn from_population(inner: RulePopulation) -> Self {
        let weights: BTreeMap<Rule, f64> = inner.rules().map(|r| (*r, 1.0)).collect();
        let mut population = Self {
            inner,
            weights,
            probability: BTreeMap::new(),
        };
        population.renormalize_all();
        population
    }

    pub fn into_inner(self) -> RulePopulation {
        self.inner
    }

    /// Inserts a rule with an explicit raw weight and renormalizes its
    /// parent group.
    pub fn add_rule_with_weight(&mut self, rule: Rule, weight: f64) -> bool {
        if let Some(old) = self.inner.displaced_by(&rule) {
            self.remove_rule(&old);
        }
        let added = self.inner.insert(rule);
        self.weights.insert(rule, weight.max(0.0));
        self.renormalize(rule.parent());
        added
    }

    /// Replaces the raw weights of existing rules and renormalizes every
    /// touched parent group. Unknown rules are ignored.
    pub fn set_weights<I: IntoIterator<Item = (Rule, f64)>>(&mut self, weights: I) {
        let mut parents = Vec::new();
        for (rule, weight) in weights {
            if let Some(w) = self.weights.get_mut(&rule) {
                *w = weight.max(0.0);
                parents.push(rule.parent());
            }
        }
        parents.sort_unstable();
        parents.dedup();
        for parent in parents {
            self.renormalize(parent);
        }
    }

    /// Summed probability of all rules with the given parent.
    pub fn parent_probability_sum(&self, parent: Symbol) -> f64 {
        self.probability
            .iter()
            .filter(|(r, _)| r.parent() == parent)
            .map(|(_, p)| p)
            .sum()
    }

    fn default_weight(&self, parent: Symbol) -> f64 {
        let (sum, count) = self
            .weights
            .iter()
            .filter(|(r, _)| r.parent() == parent)
            .fold((0.0, 0usize), |(s, c), (_, w)| (s + w, c + 1));
        if count == 0 || sum <= 0.0 {
            1.0
        } else {
            sum / count as f64
        }
    }

    fn renormalize(&mut self, parent: Symbol) {
        let group: Vec<(Rule, f64)> = self
            .weights
            .iter()
            .filter(|(r, _)| r.parent() == parent)
            .map(|(r, w)| (*r, *w))
            .collect();
        let total: f64 = group.iter().map(|(_, w)| w).sum();
        let uniform = 1.0 / group.len().max(1) as f64;
        for (rule, weight) in group {
            let p = if total > 0.0 { weight / total } else { uniform };
            self.probability.insert(rule, p);
        }
    }

    fn renormalize_all(&mut self) {
        let mut parents: Vec<Symbol> = self.weights.keys().map(Rule::parent).collect();
        parents.dedup();
        for parent in parents {
            self.renormalize(parent);
        }
    }
}

impl RuleStore for StochasticRulePopulation {
    fn population(&self) -> &RulePopulation {
        &self.inner
    }

    fn add_rule(&mut self, rule: Rule) -> bool {
        let weight = self.default_weight(rule.parent());
        self.add_rule_with_weight(rule, weight)
    }

    fn remove_rule(&mut self, rule: &Rule) -> bool {
        let removed = self.inner.delete(rule);
        if removed {
            self.weights.remove(rule);
            self.probability.remove(rule);
            self.renormalize(rule.parent());
        }
        removed
    }

    fn probability(&self, rule: &Rule) -> f64 {
        self.probability.get(rule).copied().unwrap_or(0.0)
    }
}
