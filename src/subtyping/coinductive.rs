//! Subtyping with assumptions kept for the whole check.
//!
//! Every pair visited anywhere in the walk stays assumed until the top-level
//! call returns. This is the greatest-fixpoint reading of the rules: each pair
//! of nodes is expanded at most once, so a check costs at most one rule
//! evaluation per edge of the product graph.

use super::{run, Discipline};
use crate::{cancel::CancelFlag, ty::Type};

pub(crate) struct Coinductive;

impl Discipline for Coinductive {
    const NAME: &'static str = "coinductive";
    const DISCHARGE: bool = false;
}

/// Whether the root of `left` is a subtype of the root of `right`.
///
/// Answers `false` as soon as `cancel` is observed set.
pub fn subtype(left: &Type, right: &Type, cancel: &CancelFlag) -> bool {
    subtype_counted(left, right, cancel).0
}

/// Like [`subtype`], also returning the number of rule evaluations.
pub fn subtype_counted(left: &Type, right: &Type, cancel: &CancelFlag) -> (bool, u64) {
    run::<Coinductive>(left, right, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    /// μX. p0⊕{l0: X, l1: X} unrolled `depth` times before closing the loop.
    fn unrolled(depth: usize) -> Type {
        let mut ty = Type::new();
        let first = ty.push(Node::End);
        let mut current = first;
        for _ in 1..depth {
            let next = ty.push(Node::End);
            *ty.node_mut(current) = Node::Branch {
                participant: 0,
                branches: vec![(0, next), (1, next)],
            };
            current = next;
        }
        *ty.node_mut(current) = Node::Branch {
            participant: 0,
            branches: vec![(0, first), (1, first)],
        };
        ty.set_root(first);
        ty
    }

    #[test]
    fn differently_unrolled_loops_are_equivalent() {
        let cancel = CancelFlag::new();
        let (two, three) = (unrolled(2), unrolled(3));
        assert!(subtype(&two, &three, &cancel));
        assert!(subtype(&three, &two, &cancel));
    }

    #[test]
    fn every_pair_is_expanded_once() {
        let cancel = CancelFlag::new();
        let (two, three) = (unrolled(2), unrolled(3));
        // 6 distinct pairs, each reached through both of its two incoming edges
        // plus the initial call on the roots
        let (holds, steps) = subtype_counted(&two, &three, &cancel);
        assert!(holds);
        assert_eq!(steps, 13);
    }
}
