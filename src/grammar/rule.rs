//! CNF production rules.

use std::fmt;

use super::symbol::Symbol;

/// A rule in Chomsky Normal Form.
///
/// `right == None` marks a terminal rule `parent → left` where `left` is a
/// terminal; otherwise the rule is `parent → left right` over non-terminals.
/// Rules are immutable values compared by their field tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    parent: Symbol,
    left: Symbol,
    right: Option<Symbol>,
}

impl Rule {
    /// Builds a rule from raw symbol ids, the form used by population import.
    pub fn from_ids(parent: Symbol, left: Symbol, right: Option<Symbol>) -> Self {
        Self {
            parent,
            left,
            right,
        }
    }

    pub fn non_terminal(parent: Symbol, left: Symbol, right: Symbol) -> Self {
        Self::from_ids(parent, left, Some(right))
    }

    pub fn terminal(parent: Symbol, terminal: Symbol) -> Self {
        Self::from_ids(parent, terminal, None)
    }

    pub fn parent(&self) -> Symbol {
        self.parent
    }

    pub fn left(&self) -> Symbol {
        self.left
    }

    pub fn right(&self) -> Option<Symbol> {
        self.right
    }

    pub fn is_terminal(&self) -> bool {
        self.right.is_none()
    }

    /// Number of right-hand side symbols (1 or 2).
    pub fn arity(&self) -> usize {
        if self.right.is_some() {
            2
        } else {
            1
        }
    }

    /// Returns a copy with a different parent.
    pub fn with_parent(&self, parent: Symbol) -> Self {
        Self { parent, ..*self }
    }

    /// Returns a copy with a different left child.
    pub fn with_left(&self, left: Symbol) -> Self {
        Self { left, ..*self }
    }

    /// Returns a copy with a different right child. No-op on terminal rules.
    pub fn with_right(&self, right: Symbol) -> Self {
        match self.right {
            Some(_) => Self {
                right: Some(right),
                ..*self
            },
            None => *self,
        }
    }

    /// Number of matching `{parent, left, right}` fields, or `-1` when the
    /// arities differ.
    pub fn affinity(&self, other: &Rule) -> i32 {
        if self.arity() != other.arity() {
            return -1;
        }
        i32::from(self.parent == other.parent)
            + i32::from(self.left == other.left)
            + i32::from(self.right.is_some() && self.right == other.right)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.right {
            Some(right) => write!(f, "{} -> {} {}", self.parent, self.left, right),
            None => write!(f, "{} -> {}", self.parent, self.left),
        }
    }
}
