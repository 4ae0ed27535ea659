//! Replacement strategy parameters.

/// Parameters of crowding replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrowdingConfig {
    /// Number of samples drawn; each contributes its worst rule to the
    /// weak set.
    pub factor: usize,

    /// Number of rules per sample.
    pub size: usize,
}

impl Default for CrowdingConfig {
    fn default() -> Self {
        Self { factor: 2, size: 3 }
    }
}

impl CrowdingConfig {
    pub fn new(factor: usize, size: usize) -> Self {
        Self { factor, size }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.factor == 0 {
            return Err("crowding factor must be at least 1".into());
        }
        if self.size == 0 {
            return Err("crowding size must be at least 1".into());
        }
        Ok(())
    }
}

/// Parameters of elitism.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElitismConfig {
    /// Number of top-fitness non-terminal rules protected from eviction.
    pub size: usize,
}

impl Default for ElitismConfig {
    fn default() -> Self {
        Self { size: 10 }
    }
}

impl ElitismConfig {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}
