//! Error type shared by every subsystem.
//!
//! Every variant is a programming or configuration defect: they surface
//! synchronously and are never retried. A sentence the grammar cannot
//! derive is a normal parse outcome and never an error.

use thiserror::Error;

use crate::grammar::Symbol;

/// Errors produced by the induction engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A by-right-pair lookup received a right-hand side that is not a pair.
    #[error("invalid arity: by-right lookup expects 2 symbols, got {actual}")]
    InvalidArity { actual: usize },

    /// A CYK table coordinate lies outside the triangular table.
    #[error("table coordinate ({row}, {col}) out of bounds for sentence length {length}")]
    OutOfBounds {
        row: usize,
        col: usize,
        length: usize,
    },

    /// Universal coverage fired but no universal symbol is configured.
    #[error("universal coverage requires a universal symbol, none configured")]
    MissingUniversalSymbol,

    /// The orchestrator was started without any stop criterion.
    #[error("no stop criterion installed: configure max steps, max time or satisfying fitness")]
    NoStopCriterion,

    /// A word was not found in the symbol table.
    #[error("unknown word: \"{word}\"")]
    UnknownWord { word: String },

    /// A symbol id was not found in the symbol table.
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: Symbol },

    /// A configuration struct failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
