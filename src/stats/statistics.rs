//! Per-rule usage counters and memoized fitness.

use std::collections::BTreeMap;

use super::fitness::FitnessFunction;
use crate::grammar::{Label, Rule, Symbol};

/// Mutable counters attached to one rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleInfo {
    /// Uses in any accepted sentence.
    pub usage: u64,

    /// Uses in accepted positive sentences.
    pub valid_usage: u64,

    /// Uses in accepted negative sentences.
    pub invalid_usage: u64,

    /// Net fertility points.
    pub points: f64,

    pub(crate) fitness: Option<f64>,
}

impl RuleInfo {
    /// Fitness memoized by the last [`RuleStatistics::update_fitness`].
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }
}

/// Counters aggregated over all rules sharing a parent symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeftSideInfo {
    pub usage: u64,
    pub rule_count: usize,
}

/// Global minimum and maximum of fertility points over all tracked rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FertilityExtrema {
    min: f64,
    max: f64,
    min_rule: Option<Rule>,
    max_rule: Option<Rule>,
}

impl FertilityExtrema {
    /// Extrema with fixed bounds and no owning rules.
    pub fn from_bounds(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_rule: None,
            max_rule: None,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Min/max/mean fitness over the population at the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Usage statistics and fitness for every rule of a population.
///
/// Must be notified of every rule insertion and removal so that its rule
/// set mirrors the population. Usage of rules it does not track is ignored.
#[derive(Debug, Clone)]
pub struct RuleStatistics {
    function: FitnessFunction,
    rules: BTreeMap<Rule, RuleInfo>,
    left_sides: BTreeMap<Symbol, LeftSideInfo>,
    extrema: FertilityExtrema,
    summary: FitnessSummary,
}

impl RuleStatistics {
    pub fn new(function: FitnessFunction) -> Self {
        Self {
            function,
            rules: BTreeMap::new(),
            left_sides: BTreeMap::new(),
            extrema: FertilityExtrema::default(),
            summary: FitnessSummary::default(),
        }
    }

    /// Statistics tracking every rule of an existing population.
    pub fn for_rules<'a, I: IntoIterator<Item = &'a Rule>>(function: FitnessFunction, rules: I) -> Self {
        let mut statistics = Self::new(function);
        for rule in rules {
            statistics.add_rule(*rule);
        }
        statistics
    }

    pub fn function(&self) -> &FitnessFunction {
        &self.function
    }

    /// Starts tracking a rule with zeroed counters.
    pub fn add_rule(&mut self, rule: Rule) {
        if self.rules.contains_key(&rule) {
            return;
        }
        let was_empty = self.rules.is_empty();
        self.rules.insert(rule, RuleInfo::default());
        self.left_sides.entry(rule.parent()).or_default().rule_count += 1;

        if was_empty {
            self.extrema = FertilityExtrema {
                min: 0.0,
                max: 0.0,
                min_rule: Some(rule),
                max_rule: Some(rule),
            };
        } else {
            self.touch_extrema(rule, 0.0, 0.0);
        }
    }

    /// Stops tracking a rule.
    pub fn remove_rule(&mut self, rule: &Rule) {
        let Some(info) = self.rules.remove(rule) else {
            return;
        };
        if let Some(left) = self.left_sides.get_mut(&rule.parent()) {
            left.rule_count = left.rule_count.saturating_sub(1);
            left.usage = left.usage.saturating_sub(info.usage);
            if left.rule_count == 0 {
                self.left_sides.remove(&rule.parent());
            }
        }
        if self.extrema.min_rule == Some(*rule) || self.extrema.max_rule == Some(*rule) {
            self.rescan_extrema();
        }
    }

    /// Records one use of `rule` in an accepted sentence with the given label.
    ///
    /// Returns `false` if the rule is not tracked.
    pub fn record_usage(&mut self, rule: &Rule, label: Label) -> bool {
        let (reward, penalty) = self.function.fertility_points();
        let Some(info) = self.rules.get_mut(rule) else {
            return false;
        };
        let old_points = info.points;
        info.usage += 1;
        match label {
            Label::Positive => {
                info.valid_usage += 1;
                info.points += reward;
            }
            Label::Negative => {
                info.invalid_usage += 1;
                info.points -= penalty;
            }
            Label::Unknown => {}
        }
        let new_points = info.points;
        self.left_sides.entry(rule.parent()).or_default().usage += 1;
        if new_points != old_points {
            self.touch_extrema(*rule, old_points, new_points);
        }
        true
    }

    /// Clears usage counters of every rule, keeping the rule set.
    pub fn reset_usage(&mut self) {
        for info in self.rules.values_mut() {
            *info = RuleInfo::default();
        }
        for left in self.left_sides.values_mut() {
            left.usage = 0;
        }
        self.rescan_extrema();
    }

    /// Recomputes and memoizes the fitness of every rule.
    ///
    /// Called once per generation, after the parse pass.
    pub fn update_fitness(&mut self) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for info in self.rules.values_mut() {
            let f = self.function.calculate(info, &self.extrema);
            info.fitness = Some(f);
            min = min.min(f);
            max = max.max(f);
            sum += f;
        }
        self.summary = if self.rules.is_empty() {
            FitnessSummary::default()
        } else {
            FitnessSummary {
                min,
                max,
                mean: sum / self.rules.len() as f64,
            }
        };
    }

    /// Fitness of a rule: the memoized value if present, otherwise computed
    /// from current counters. Untracked rules are scored as unused.
    pub fn fitness(&self, rule: &Rule) -> f64 {
        match self.rules.get(rule) {
            Some(info) => info
                .fitness
                .unwrap_or_else(|| self.function.calculate(info, &self.extrema)),
            None => self.function.calculate(&RuleInfo::default(), &self.extrema),
        }
    }

    pub fn rule_info(&self, rule: &Rule) -> Option<&RuleInfo> {
        self.rules.get(rule)
    }

    pub fn left_side_info(&self, parent: Symbol) -> Option<&LeftSideInfo> {
        self.left_sides.get(&parent)
    }

    pub fn extrema(&self) -> &FertilityExtrema {
        &self.extrema
    }

    pub fn summary(&self) -> FitnessSummary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn tracks(&self, rule: &Rule) -> bool {
        self.rules.contains_key(rule)
    }

    /// Incremental extrema maintenance. Rescans only when the touched rule
    /// held an extremum and moved away from it.
    fn touch_extrema(&mut self, rule: Rule, old: f64, new: f64) {
        let mut rescan = false;
        if new >= self.extrema.max {
            self.extrema.max = new;
            self.extrema.max_rule = Some(rule);
        } else if self.extrema.max_rule == Some(rule) && new < old {
            rescan = true;
        }
        if new <= self.extrema.min {
            self.extrema.min = new;
            self.extrema.min_rule = Some(rule);
        } else if self.extrema.min_rule == Some(rule) && new > old {
            rescan = true;
        }
        if rescan {
            self.rescan_extrema();
        }
    }

    fn rescan_extrema(&mut self) {
        let mut extrema = FertilityExtrema::default();
        let mut first = true;
        for (rule, info) in &self.rules {
            if first || info.points < extrema.min {
                extrema.min = info.points;
                extrema.min_rule = Some(*rule);
            }
            if first || info.points > extrema.max {
                extrema.max = info.points;
                extrema.max_rule = Some(*rule);
            }
            first = false;
        }
        self.extrema = extrema;
    }
}
