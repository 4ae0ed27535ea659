//! Rule fitness functions.
//!
//! Two families are provided:
//!
//! - **Pasieka**: the raw usage count of a rule. Used by the stochastic
//!   variant, where usage counts feed probability estimation.
//! - **Classic**: a weighted blend of a price-weighted valid-usage ratio
//!   and normalized fertility. Always lies in `[0, 1]` for non-negative
//!   weights and a `base_fitness` in `[0, 1]`.
//!
//! Higher fitness is better.

use super::statistics::{FertilityExtrema, RuleInfo};

/// Parameters of the classic fitness blend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassicFitness {
    /// Weight of the valid-usage ratio in the blend.
    pub classic_weight: f64,

    /// Weight of normalized fertility in the blend.
    pub fertility_weight: f64,

    /// Fitness reported for rules never used in an accepted labeled sentence.
    pub base_fitness: f64,

    /// Price of one use in an accepted positive sentence.
    pub valid_price: f64,

    /// Price of one use in an accepted negative sentence.
    pub invalid_price: f64,

    /// Fertility points earned per use in an accepted positive sentence.
    pub fertility_reward: f64,

    /// Fertility points lost per use in an accepted negative sentence.
    pub fertility_penalty: f64,
}

impl Default for ClassicFitness {
    fn default() -> Self {
        Self {
            classic_weight: 1.0,
            fertility_weight: 1.0,
            base_fitness: 0.5,
            valid_price: 1.0,
            invalid_price: 1.0,
            fertility_reward: 1.0,
            fertility_penalty: 1.0,
        }
    }
}

impl ClassicFitness {
    pub fn with_weights(mut self, classic: f64, fertility: f64) -> Self {
        self.classic_weight = classic;
        self.fertility_weight = fertility;
        self
    }

    pub fn with_base_fitness(mut self, base: f64) -> Self {
        self.base_fitness = base.clamp(0.0, 1.0);
        self
    }

    pub fn with_prices(mut self, valid: f64, invalid: f64) -> Self {
        self.valid_price = valid;
        self.invalid_price = invalid;
        self
    }

    fn calculate(&self, info: &RuleInfo, extrema: &FertilityExtrema) -> f64 {
        if info.valid_usage + info.invalid_usage == 0 {
            return self.base_fitness;
        }

        let valid = self.valid_price * info.valid_usage as f64;
        let invalid = self.invalid_price * info.invalid_usage as f64;
        let classic = if valid + invalid > 0.0 {
            valid / (valid + invalid)
        } else {
            self.base_fitness
        };

        let mut span = extrema.max() - extrema.min();
        if span <= 0.0 {
            span = 1.0;
        }
        let fertility = ((info.points - extrema.min()) / span).clamp(0.0, 1.0);

        let total_weight = self.classic_weight + self.fertility_weight;
        if total_weight <= 0.0 {
            return classic;
        }
        (self.classic_weight * classic + self.fertility_weight * fertility) / total_weight
    }
}

/// Fitness family used by a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessFunction {
    /// Raw usage count.
    Pasieka,

    /// Weighted blend of valid-usage ratio and fertility.
    Classic(ClassicFitness),
}

impl Default for FitnessFunction {
    fn default() -> Self {
        FitnessFunction::Classic(ClassicFitness::default())
    }
}

impl FitnessFunction {
    /// Computes the fitness of one rule from its counters.
    pub fn calculate(&self, info: &RuleInfo, extrema: &FertilityExtrema) -> f64 {
        match self {
            FitnessFunction::Pasieka => info.usage as f64,
            FitnessFunction::Classic(classic) => classic.calculate(info, extrema),
        }
    }

    /// Fertility points (reward, penalty) per accepted positive / negative use.
    pub fn fertility_points(&self) -> (f64, f64) {
        match self {
            FitnessFunction::Pasieka => (1.0, 1.0),
            FitnessFunction::Classic(c) => (c.fertility_reward, c.fertility_penalty),
        }
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), String> {
        let FitnessFunction::Classic(c) = self else {
            return Ok(());
        };
        if c.classic_weight < 0.0 || c.fertility_weight < 0.0 {
            return Err("fitness weights must be non-negative".into());
        }
        if !(0.0..=1.0).contains(&c.base_fitness) {
            return Err("base_fitness must lie in [0, 1]".into());
        }
        if c.valid_price < 0.0 || c.invalid_price < 0.0 {
            return Err("usage prices must be non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(valid: u64, invalid: u64, points: f64) -> RuleInfo {
        RuleInfo {
            usage: valid + invalid,
            valid_usage: valid,
            invalid_usage: invalid,
            points,
            ..RuleInfo::default()
        }
    }

    #[test]
    fn test_classic_unused_returns_base() {
        let f = FitnessFunction::Classic(ClassicFitness::default().with_base_fitness(0.3));
        let extrema = FertilityExtrema::default();
        assert_eq!(f.calculate(&RuleInfo::default(), &extrema), 0.3);
    }

    #[test]
    fn test_classic_only_valid_usage() {
        let f = FitnessFunction::Classic(ClassicFitness::default().with_weights(1.0, 0.0));
        let extrema = FertilityExtrema::from_bounds(0.0, 4.0);
        assert!((f.calculate(&info(4, 0, 4.0), &extrema) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_classic_blend() {
        let f = FitnessFunction::Classic(ClassicFitness::default());
        // classic = 3 / 4, fertility = (2 - (-2)) / (4 - (-2)) = 4/6
        let extrema = FertilityExtrema::from_bounds(-2.0, 4.0);
        let expected = (0.75 + 4.0 / 6.0) / 2.0;
        assert!((f.calculate(&info(3, 1, 2.0), &extrema) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_classic_tied_extrema() {
        let f = FitnessFunction::Classic(ClassicFitness::default().with_weights(0.0, 1.0));
        let extrema = FertilityExtrema::from_bounds(1.0, 1.0);
        assert_eq!(f.calculate(&info(1, 0, 1.0), &extrema), 0.0);
    }

    #[test]
    fn test_pasieka_is_usage() {
        let f = FitnessFunction::Pasieka;
        assert_eq!(f.calculate(&info(5, 2, 0.0), &FertilityExtrema::default()), 7.0);
    }

    #[test]
    fn test_validate() {
        assert!(FitnessFunction::default().validate().is_ok());
        let bad = FitnessFunction::Classic(ClassicFitness::default().with_weights(-1.0, 1.0));
        assert!(bad.validate().is_err());
        let bad = FitnessFunction::Classic(ClassicFitness {
            base_fitness: 2.0,
            ..ClassicFitness::default()
        });
        assert!(bad.validate().is_err());
    }
}
