//! Threshold access trees: the policy language of the CP-ABE scheme.
//!
//! An access tree is a pure policy value — internal nodes are
//! (threshold, arity) gates, leaves carry attribute labels. The per-leaf
//! share points that encryption produces do *not* live in the tree; they sit
//! in a parallel vector indexed by depth-first leaf order, so a policy can
//! be reused across ciphertexts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node of an access tree.
///
/// `AND` over n children is a `(n, n)` gate, `OR` a `(1, n)` gate; a general
/// `(k, n)` gate is satisfied when at least `k` children are.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTree {
    Leaf {
        attribute: String,
    },
    Gate {
        threshold: usize,
        children: Vec<AccessTree>,
    },
}

impl AccessTree {
    pub fn leaf(attribute: impl Into<String>) -> Self {
        Self::Leaf {
            attribute: attribute.into(),
        }
    }

    /// An AND gate: all children must be satisfied.
    pub fn and(children: Vec<AccessTree>) -> Self {
        Self::Gate {
            threshold: children.len(),
            children,
        }
    }

    /// An OR gate: one child suffices.
    pub fn or(children: Vec<AccessTree>) -> Self {
        Self::Gate {
            threshold: 1,
            children,
        }
    }

    /// A general `threshold`-of-`children.len()` gate.
    pub fn threshold(threshold: usize, children: Vec<AccessTree>) -> Self {
        Self::Gate {
            threshold,
            children,
        }
    }

    /// Checks the structural invariants: every gate has `1 <= k <= n` with
    /// at least one child, every leaf a non-empty attribute.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Leaf { attribute } => {
                if attribute.is_empty() {
                    return Err(Error::InvalidAccessTree);
                }
            }
            Self::Gate {
                threshold,
                children,
            } => {
                if children.is_empty() || *threshold < 1 || *threshold > children.len() {
                    return Err(Error::InvalidAccessTree);
                }
                for child in children {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Whether the attribute set satisfies this (sub)tree.
    pub fn satisfied_by<S: AsRef<str>>(&self, attributes: &[S]) -> bool {
        match self {
            Self::Leaf { attribute } => attributes.iter().any(|a| a.as_ref() == attribute),
            Self::Gate {
                threshold,
                children,
            } => {
                let satisfied = children
                    .iter()
                    .filter(|child| child.satisfied_by(attributes))
                    .count();
                satisfied >= *threshold
            }
        }
    }

    /// The number of leaves, in depth-first order.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Gate { children, .. } => children.iter().map(AccessTree::leaf_count).sum(),
        }
    }
}
