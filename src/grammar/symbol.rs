//! Symbols, sentences and the word/symbol translator boundary.
//!
//! Terminals carry negative ids, non-terminals positive ids in
//! `[1, max_non_terminal_symbols]`. Id `0` is never assigned.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Integer symbol identity.
pub type Symbol = i32;

/// Returns `true` if the symbol denotes a terminal.
#[inline]
pub fn is_terminal(symbol: Symbol) -> bool {
    symbol < 0
}

/// Returns `true` if the symbol denotes a non-terminal.
#[inline]
pub fn is_non_terminal(symbol: Symbol) -> bool {
    symbol > 0
}

/// Membership label of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    Positive,
    Negative,
    Unknown,
}

/// An immutable, labeled sequence of terminal symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sentence {
    symbols: Vec<Symbol>,
    label: Label,
}

impl Sentence {
    pub fn new(symbols: Vec<Symbol>, label: Label) -> Self {
        Self { symbols, label }
    }

    pub fn positive(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols, Label::Positive)
    }

    pub fn negative(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols, Label::Negative)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_positive(&self) -> bool {
        self.label == Label::Positive
    }
}

/// Bidirectional word ↔ symbol mapping.
///
/// Terminal words receive ids `-1, -2, …` in order of first registration;
/// named non-terminals receive `1, 2, …`. Lookups of unregistered words
/// or ids are caller bugs and return an error.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    by_word: BTreeMap<String, Symbol>,
    by_symbol: BTreeMap<Symbol, String>,
    next_terminal: Symbol,
    next_non_terminal: Symbol,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            by_word: BTreeMap::new(),
            by_symbol: BTreeMap::new(),
            next_terminal: -1,
            next_non_terminal: 1,
        }
    }

    /// Registers a terminal word, returning its (possibly existing) id.
    pub fn intern_terminal(&mut self, word: &str) -> Symbol {
        if let Some(&symbol) = self.by_word.get(word) {
            return symbol;
        }
        let symbol = self.next_terminal;
        self.next_terminal -= 1;
        self.insert(word, symbol);
        symbol
    }

    /// Registers a non-terminal name, returning its (possibly existing) id.
    pub fn intern_non_terminal(&mut self, name: &str) -> Symbol {
        if let Some(&symbol) = self.by_word.get(name) {
            return symbol;
        }
        let symbol = self.next_non_terminal;
        self.next_non_terminal += 1;
        self.insert(name, symbol);
        symbol
    }

    fn insert(&mut self, word: &str, symbol: Symbol) {
        self.by_word.insert(word.to_owned(), symbol);
        self.by_symbol.insert(symbol, word.to_owned());
    }

    pub fn symbol(&self, word: &str) -> Result<Symbol> {
        self.by_word
            .get(word)
            .copied()
            .ok_or_else(|| Error::UnknownWord {
                word: word.to_owned(),
            })
    }

    pub fn word(&self, symbol: Symbol) -> Result<&str> {
        self.by_symbol
            .get(&symbol)
            .map(String::as_str)
            .ok_or(Error::UnknownSymbol { symbol })
    }

    /// Translates whitespace-separated words into a sentence.
    ///
    /// Every word must already be registered.
    pub fn sentence(&self, text: &str, label: Label) -> Result<Sentence> {
        let symbols = text
            .split_whitespace()
            .map(|w| self.symbol(w))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sentence::new(symbols, label))
    }

    pub fn terminal_count(&self) -> usize {
        (-1 - self.next_terminal) as usize
    }
}
