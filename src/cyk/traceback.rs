//! Traceback: extracting the rules a completed table actually used.

use std::collections::BTreeSet;

use super::table::{Environment, Production};
use crate::error::Result;
use crate::grammar::{Rule, Symbol};

/// Traceback strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traceback {
    /// Every derivation of the starting symbol; each rule reported once.
    Exhaustive,
    /// The single most probable derivation; rules reported per occurrence.
    BestTree,
}

impl Traceback {
    /// Rules used by derivations of `start` over the whole sentence.
    ///
    /// Returns an empty list when the top cell does not derive `start`.
    pub fn trace(&self, environment: &Environment, start: Symbol) -> Result<Vec<Rule>> {
        match self {
            Traceback::Exhaustive => exhaustive(environment, start),
            Traceback::BestTree => best_tree(environment, start),
        }
    }
}

/// Child `(row, col, symbol)` nodes of a non-terminal production.
fn children(production: &Production) -> Option<[(usize, usize, Symbol); 2]> {
    let rule = production.rule?;
    let right = rule.right()?;
    let (lr, lc) = production.detector.left_cell()?;
    let (rr, rc) = production.detector.right_cell()?;
    Some([(lr, lc, rule.left()), (rr, rc, right)])
}

fn exhaustive(environment: &Environment, start: Symbol) -> Result<Vec<Rule>> {
    let Some(length) = environment.length().checked_sub(1) else {
        return Ok(Vec::new());
    };
    let mut used = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut stack = vec![(length, 0, start)];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        let (row, col, symbol) = node;
        for production in environment.cell(row, col)?.productions_for(symbol) {
            if let Some(rule) = production.rule {
                used.insert(rule);
            }
            if let Some(nodes) = children(production) {
                stack.extend(nodes.into_iter().filter(|n| !visited.contains(n)));
            }
        }
    }
    Ok(used.into_iter().collect())
}

fn best_tree(environment: &Environment, start: Symbol) -> Result<Vec<Rule>> {
    let Some(length) = environment.length().checked_sub(1) else {
        return Ok(Vec::new());
    };
    let mut used = Vec::new();
    let mut stack = vec![(length, 0, start)];

    while let Some((row, col, symbol)) = stack.pop() {
        let Some(production) = environment.cell(row, col)?.best_production(symbol) else {
            continue;
        };
        if let Some(rule) = production.rule {
            used.push(rule);
        }
        if let Some(nodes) = children(production) {
            stack.extend(nodes);
        }
    }
    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cyk::table::{Detector, ProductionPool};

    const S: Symbol = 1;
    const A: Symbol = 2;
    const B: Symbol = 3;

    /// Table for "a b" with S -> A B (p=0.6), S -> B A unused,
    /// A -> a, B -> b, and an extra derivation S -> A A (p=0.4) over
    /// an A in the right cell.
    fn environment() -> Environment {
        let mut env = Environment::new(2);
        let a = Detector::terminal(0, -1);
        let b = Detector::terminal(1, -2);

        let mut left = ProductionPool::new();
        left.add(Production::new(a, Rule::terminal(A, -1), 1.0));
        *env.cell_mut(0, 0).unwrap() = left;

        let mut right = ProductionPool::new();
        right.add(Production::new(b, Rule::terminal(B, -2), 1.0));
        right.add(Production::new(b, Rule::terminal(A, -2), 0.5));
        *env.cell_mut(0, 1).unwrap() = right;

        let mut top = ProductionPool::new();
        let ab = Detector::split(1, 0, 0, A, B);
        let aa = Detector::split(1, 0, 0, A, A);
        top.add(Production::new(ab, Rule::non_terminal(S, A, B), 0.6));
        top.add(Production::new(aa, Rule::non_terminal(S, A, A), 0.2));
        *env.cell_mut(1, 0).unwrap() = top;
        env
    }

    #[test]
    fn test_exhaustive_collects_all_derivations_once() {
        let used = Traceback::Exhaustive.trace(&environment(), S).unwrap();
        assert_eq!(
            used,
            vec![
                Rule::non_terminal(S, A, A),
                Rule::non_terminal(S, A, B),
                Rule::terminal(A, -2),
                Rule::terminal(A, -1),
                Rule::terminal(B, -2),
            ]
        );
    }

    #[test]
    fn test_best_tree_follows_highest_probability() {
        let mut used = Traceback::BestTree.trace(&environment(), S).unwrap();
        used.sort();
        assert_eq!(
            used,
            vec![
                Rule::non_terminal(S, A, B),
                Rule::terminal(A, -1),
                Rule::terminal(B, -2),
            ]
        );
    }

    #[test]
    fn test_no_start_no_usage() {
        assert!(Traceback::Exhaustive.trace(&environment(), 9).unwrap().is_empty());
        assert!(Traceback::BestTree.trace(&environment(), 9).unwrap().is_empty());
        assert!(Traceback::Exhaustive
            .trace(&Environment::new(0), S)
            .unwrap()
            .is_empty());
    }
}
