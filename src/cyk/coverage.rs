//! Coverage operators: on-demand rule synthesis during parsing.
//!
//! | Operator | Site | Synthesized rule |
//! |---|---|---|
//! | Terminal | uncovered terminal | random non-terminal → terminal |
//! | Universal | uncovered terminal | universal symbol → terminal |
//! | Starting | single-terminal positive sentence | starting symbol → terminal |
//! | Aggressive | empty cell, positive sentence | random parent → split effectors |
//! | Full | top cell without start, positive sentence | starting symbol → split effectors |
//!
//! Each operator is gated by its own chance and carries the hint used to
//! submit its rule to the supervisor.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::table::Detector;
use crate::adding::AddingRuleHint;
use crate::error::{Error, Result};
use crate::grammar::{Rule, RulePopulation, Symbol};
use crate::random::chance;

/// Chance and submission hint of one coverage operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageOperatorConfig {
    /// Probability that the operator fires when triggered (0.0–1.0).
    pub chance: f64,

    /// Hint attached to the synthesized rule.
    pub hint: AddingRuleHint,
}

impl CoverageOperatorConfig {
    pub fn new(chance: f64, hint: AddingRuleHint) -> Self {
        Self {
            chance: chance.clamp(0.0, 1.0),
            hint,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0.0, AddingRuleHint::ExpandPopulation)
    }
}

/// Configuration of all five coverage operators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageConfig {
    pub terminal: CoverageOperatorConfig,
    pub universal: CoverageOperatorConfig,
    pub starting: CoverageOperatorConfig,
    pub aggressive: CoverageOperatorConfig,
    pub full: CoverageOperatorConfig,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        let expand = |chance| CoverageOperatorConfig::new(chance, AddingRuleHint::ExpandPopulation);
        Self {
            terminal: expand(1.0),
            universal: CoverageOperatorConfig::disabled(),
            starting: expand(1.0),
            aggressive: expand(1.0),
            full: expand(1.0),
        }
    }
}

impl CoverageConfig {
    /// All operators switched off; parsing never modifies the grammar.
    pub fn disabled() -> Self {
        Self {
            terminal: CoverageOperatorConfig::disabled(),
            universal: CoverageOperatorConfig::disabled(),
            starting: CoverageOperatorConfig::disabled(),
            aggressive: CoverageOperatorConfig::disabled(),
            full: CoverageOperatorConfig::disabled(),
        }
    }

    pub fn with_terminal(mut self, config: CoverageOperatorConfig) -> Self {
        self.terminal = config;
        self
    }

    pub fn with_universal(mut self, config: CoverageOperatorConfig) -> Self {
        self.universal = config;
        self
    }

    pub fn with_starting(mut self, config: CoverageOperatorConfig) -> Self {
        self.starting = config;
        self
    }

    pub fn with_aggressive(mut self, config: CoverageOperatorConfig) -> Self {
        self.aggressive = config;
        self
    }

    pub fn with_full(mut self, config: CoverageOperatorConfig) -> Self {
        self.full = config;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, op) in [
            ("terminal", &self.terminal),
            ("universal", &self.universal),
            ("starting", &self.starting),
            ("aggressive", &self.aggressive),
            ("full", &self.full),
        ] {
            if !(0.0..=1.0).contains(&op.chance) {
                return Err(format!("{name} coverage chance must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

/// Which coverage operator this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageKind {
    Terminal,
    Universal,
    Starting,
    Aggressive,
    Full,
}

/// Where in the table coverage was requested.
#[derive(Debug, Clone, Copy)]
pub enum CoverageSite<'a> {
    /// A row-0 cell for `terminal` at column `col`.
    Terminal { col: usize, terminal: Symbol },
    /// A row ≥ 1 cell, with the detectors coverage may pick from.
    Split { detectors: &'a [Detector] },
}

/// A chance-gated rule synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageOperator {
    kind: CoverageKind,
    config: CoverageOperatorConfig,
}

impl CoverageOperator {
    pub fn new(kind: CoverageKind, config: CoverageOperatorConfig) -> Self {
        Self { kind, config }
    }

    pub fn kind(&self) -> CoverageKind {
        self.kind
    }

    pub fn hint(&self) -> AddingRuleHint {
        self.config.hint
    }

    /// Synthesizes a rule for `site`, together with the detector it covers.
    ///
    /// Returns `Ok(None)` when the chance gate fails, the site does not suit
    /// this operator, or there is no detector to cover.
    ///
    /// # Errors
    /// [`Error::MissingUniversalSymbol`] when universal coverage fires
    /// without a configured universal symbol.
    pub fn cover<R: Rng>(
        &self,
        population: &RulePopulation,
        site: CoverageSite<'_>,
        rng: &mut R,
    ) -> Result<Option<(Rule, Detector)>> {
        let applicable = matches!(
            (self.kind, site),
            (
                CoverageKind::Terminal | CoverageKind::Universal | CoverageKind::Starting,
                CoverageSite::Terminal { .. }
            ) | (
                CoverageKind::Aggressive | CoverageKind::Full,
                CoverageSite::Split { .. }
            )
        );
        if !applicable || !chance(rng, self.config.chance) {
            return Ok(None);
        }

        match site {
            CoverageSite::Terminal { col, terminal } => {
                let parent = match self.kind {
                    CoverageKind::Terminal => population.random_non_terminal_symbol(rng),
                    CoverageKind::Universal => population
                        .universal_symbol()
                        .ok_or(Error::MissingUniversalSymbol)?,
                    _ => population.starting_symbol(),
                };
                Ok(Some((
                    Rule::terminal(parent, terminal),
                    Detector::terminal(col, terminal),
                )))
            }
            CoverageSite::Split { detectors } => {
                let Some(detector) = detectors.choose(rng).copied() else {
                    return Ok(None);
                };
                let Some(right) = detector.right else {
                    return Ok(None);
                };
                let parent = match self.kind {
                    CoverageKind::Full => population.starting_symbol(),
                    _ => population.random_non_terminal_symbol(rng),
                };
                Ok(Some((Rule::non_terminal(parent, detector.left, right), detector)))
            }
        }
    }
}

/// The five operators built from one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageOperators {
    pub terminal: CoverageOperator,
    pub universal: CoverageOperator,
    pub starting: CoverageOperator,
    pub aggressive: CoverageOperator,
    pub full: CoverageOperator,
}

impl CoverageOperators {
    pub fn from_config(config: &CoverageConfig) -> Self {
        Self {
            terminal: CoverageOperator::new(CoverageKind::Terminal, config.terminal.clone()),
            universal: CoverageOperator::new(CoverageKind::Universal, config.universal.clone()),
            starting: CoverageOperator::new(CoverageKind::Starting, config.starting.clone()),
            aggressive: CoverageOperator::new(CoverageKind::Aggressive, config.aggressive.clone()),
            full: CoverageOperator::new(CoverageKind::Full, config.full.clone()),
        }
    }
}
