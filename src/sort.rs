//! Payload sorts carried by [`In`](crate::graph::Node::In) and
//! [`Out`](crate::graph::Node::Out) nodes.

use std::fmt;

/// The type of a single message payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    Int,
    Nat,
    Bool,
}

impl Sort {
    pub const ALL: [Sort; 3] = [Sort::Int, Sort::Nat, Sort::Bool];

    /// `self <: other`. Reflexive, plus `Nat <: Int`.
    pub fn is_subsort(self, other: Sort) -> bool {
        self == other || (self == Sort::Nat && other == Sort::Int)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sort::Int => "Int",
            Sort::Nat => "Nat",
            Sort::Bool => "Bool",
        })
    }
}
