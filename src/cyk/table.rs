//! The triangular CYK table.
//!
//! Cell `(row, col)` covers the `row + 1` terminals starting at `col`, so
//! row 0 holds terminal matches and `(n - 1, 0)` is the top cell. Cells
//! refer to each other only through coordinates.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::grammar::{Rule, Symbol};

/// One candidate split: the cell it belongs to, the split point and the
/// effector symbols observed in the two child cells.
///
/// Terminal detectors live in row 0, carry the terminal as `left` and have
/// no `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Detector {
    pub row: usize,
    pub col: usize,
    pub shift: usize,
    pub left: Symbol,
    pub right: Option<Symbol>,
}

impl Detector {
    pub fn terminal(col: usize, terminal: Symbol) -> Self {
        Self {
            row: 0,
            col,
            shift: 0,
            left: terminal,
            right: None,
        }
    }

    pub fn split(row: usize, col: usize, shift: usize, left: Symbol, right: Symbol) -> Self {
        Self {
            row,
            col,
            shift,
            left,
            right: Some(right),
        }
    }

    /// Coordinates of the left child cell, `None` for terminal detectors.
    pub fn left_cell(&self) -> Option<(usize, usize)> {
        self.right.map(|_| (self.shift, self.col))
    }

    /// Coordinates of the right child cell, `None` for terminal detectors.
    pub fn right_cell(&self) -> Option<(usize, usize)> {
        self.right
            .map(|_| (self.row - self.shift - 1, self.col + self.shift + 1))
    }
}

/// A detector with the rule that matched it, or with no rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Production {
    pub detector: Detector,
    pub rule: Option<Rule>,
    /// Viterbi probability of the best derivation through this production.
    pub probability: f64,
}

impl Production {
    pub fn new(detector: Detector, rule: Rule, probability: f64) -> Self {
        Self {
            detector,
            rule: Some(rule),
            probability,
        }
    }

    pub fn empty(detector: Detector) -> Self {
        Self {
            detector,
            rule: None,
            probability: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rule.is_none()
    }

    pub fn parent(&self) -> Option<Symbol> {
        self.rule.map(|r| r.parent())
    }
}

/// All productions of one cell.
#[derive(Debug, Clone, Default)]
pub struct ProductionPool {
    productions: Vec<Production>,
    effectors: BTreeSet<Symbol>,
    best: BTreeMap<Symbol, usize>,
    unsatisfied: Vec<Detector>,
}

impl ProductionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a production. Empty productions record their detector as
    /// unsatisfied; others register their parent as an effector.
    pub fn add(&mut self, production: Production) {
        let index = self.productions.len();
        match production.parent() {
            Some(parent) => {
                self.effectors.insert(parent);
                let better = self
                    .best
                    .get(&parent)
                    .is_none_or(|&i| production.probability > self.productions[i].probability);
                if better {
                    self.best.insert(parent, index);
                }
            }
            None => self.unsatisfied.push(production.detector),
        }
        self.productions.push(production);
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Non-empty productions whose rule derives `symbol`.
    pub fn productions_for(&self, symbol: Symbol) -> impl Iterator<Item = &Production> {
        self.productions
            .iter()
            .filter(move |p| p.parent() == Some(symbol))
    }

    pub fn effectors(&self) -> &BTreeSet<Symbol> {
        &self.effectors
    }

    pub fn has_effector(&self, symbol: Symbol) -> bool {
        self.effectors.contains(&symbol)
    }

    /// Highest-probability production for `symbol`; the first one on ties.
    pub fn best_production(&self, symbol: Symbol) -> Option<&Production> {
        self.best.get(&symbol).map(|&i| &self.productions[i])
    }

    /// Probability of the best derivation of `symbol` here, `0.0` if none.
    pub fn best_probability(&self, symbol: Symbol) -> f64 {
        self.best_production(symbol).map_or(0.0, |p| p.probability)
    }

    pub fn unsatisfied(&self) -> &[Detector] {
        &self.unsatisfied
    }

    /// Detectors of every production, satisfied or not.
    pub fn detectors(&self) -> Vec<Detector> {
        self.productions.iter().map(|p| p.detector).collect()
    }

    /// `true` when no production matched a rule.
    pub fn has_no_effectors(&self) -> bool {
        self.effectors.is_empty()
    }
}

/// The CYK table of one sentence.
#[derive(Debug, Clone)]
pub struct Environment {
    length: usize,
    cells: Vec<ProductionPool>,
}

impl Environment {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            cells: vec![ProductionPool::default(); length * length],
        }
    }

    /// Sentence length `n`.
    pub fn length(&self) -> usize {
        self.length
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.length && col + row < self.length {
            Ok(row * self.length + col)
        } else {
            Err(Error::OutOfBounds {
                row,
                col,
                length: self.length,
            })
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&ProductionPool> {
        let i = self.index(row, col)?;
        Ok(&self.cells[i])
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut ProductionPool> {
        let i = self.index(row, col)?;
        Ok(&mut self.cells[i])
    }

    /// The cell spanning the whole sentence, `None` for empty sentences.
    pub fn top(&self) -> Option<&ProductionPool> {
        self.length
            .checked_sub(1)
            .and_then(|row| self.cell(row, 0).ok())
    }
}
