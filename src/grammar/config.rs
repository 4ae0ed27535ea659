//! Grammar shape configuration.

use super::symbol::Symbol;

/// Symbol ranges and size limits of a rule population.
///
/// # Defaults
///
/// ```
/// use gcs_induction::grammar::PopulationConfig;
///
/// let config = PopulationConfig::default();
/// assert_eq!(config.starting_symbol, 1);
/// assert_eq!(config.max_non_terminal_symbols, 20);
/// assert!(config.universal_symbol.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    /// Root symbol every accepted sentence must derive from.
    pub starting_symbol: Symbol,

    /// Optional catch-all non-terminal for otherwise uncovered terminals.
    pub universal_symbol: Option<Symbol>,

    /// Upper bound of the non-terminal range `[1, max]` used when drawing
    /// random symbols.
    pub max_non_terminal_symbols: Symbol,

    /// Non-terminal rule count at which `ExpandPopulation` insertions are
    /// escalated to a size-controlling strategy.
    pub max_non_terminal_rules: usize,

    /// Number of random non-terminal rules generated before the first
    /// generation when the run starts from an empty population.
    pub initial_non_terminal_rules: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            starting_symbol: 1,
            universal_symbol: None,
            max_non_terminal_symbols: 20,
            max_non_terminal_rules: 120,
            initial_non_terminal_rules: 0,
        }
    }
}

impl PopulationConfig {
    pub fn with_starting_symbol(mut self, symbol: Symbol) -> Self {
        self.starting_symbol = symbol;
        self
    }

    pub fn with_universal_symbol(mut self, symbol: Symbol) -> Self {
        self.universal_symbol = Some(symbol);
        self
    }

    pub fn with_max_non_terminal_symbols(mut self, n: Symbol) -> Self {
        self.max_non_terminal_symbols = n;
        self
    }

    pub fn with_max_non_terminal_rules(mut self, n: usize) -> Self {
        self.max_non_terminal_rules = n;
        self
    }

    pub fn with_initial_non_terminal_rules(mut self, n: usize) -> Self {
        self.initial_non_terminal_rules = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_non_terminal_symbols < 1 {
            return Err("max_non_terminal_symbols must be at least 1".into());
        }
        if self.starting_symbol < 1 || self.starting_symbol > self.max_non_terminal_symbols {
            return Err("starting_symbol must lie in [1, max_non_terminal_symbols]".into());
        }
        if let Some(universal) = self.universal_symbol {
            if universal < 1 || universal > self.max_non_terminal_symbols {
                return Err("universal_symbol must lie in [1, max_non_terminal_symbols]".into());
            }
            if universal == self.starting_symbol {
                return Err("universal_symbol must differ from starting_symbol".into());
            }
        }
        if self.max_non_terminal_rules == 0 {
            return Err("max_non_terminal_rules must be at least 1".into());
        }
        Ok(())
    }
}
