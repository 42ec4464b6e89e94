//! Subtyping between the roots of two session-type graphs.
//!
//! Both checkers walk the product of the two graphs depth first and keep a set
//! of node pairs that are assumed related. Meeting an assumed pair again closes
//! a cycle and succeeds. The rules, first match wins:
//!
//! ```text
//! (cancel)  flag set                                       ⟹ false
//! (assume)  (n₁, n₂) ∈ σ                                   ⟹ true
//! (end)     end <: end
//! (in)      p?[s₁];S₁ <: p?[s₂];S₂   if s₂ ≤ s₁ ∧ S₁ <: S₂
//! (out)     p![s₁];S₁ <: p![s₂];S₂   if s₁ ≤ s₂ ∧ S₁ <: S₂
//! (branch)  p⊕{lᵢ:Sᵢ}ᵢ∈I <: p⊕{lⱼ:Tⱼ}ⱼ∈J   if I ⊆ J ∧ ∀i∈I. Sᵢ <: Tᵢ
//! (select)  p&{lᵢ:Sᵢ}ᵢ∈I <: p&{lⱼ:Tⱼ}ⱼ∈J   if J ⊆ I ∧ ∀j∈J. Sⱼ <: Tⱼ
//! ```
//!
//! Any other pairing fails. Branch and select labels are matched by a single
//! merge scan, which is only correct because labels are strictly ascending.
//!
//! The two checkers differ only in how long a pair stays in `σ`:
//!
//! - [`inductive`] forgets the pair once the rule that assumed it returns, so a
//!   pair is assumed only while it is an ancestor on the current path;
//! - [`coinductive`] never forgets, so every pair visited anywhere in the walk
//!   is assumed for the rest of the call.
//!
//! Neither checker mutates its inputs. Cancelled checks answer `false`, which
//! callers treat as "unknown".
//!
//! The two disciplines are the only ones; the trait that tells them apart is
//! internal:
//!
//! ```compile_fail
//! use session_subtyping::subtyping::Discipline;
//! ```

pub mod coinductive;
pub mod inductive;

use std::{fmt, marker::PhantomData};

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    cancel::CancelFlag,
    graph::{Label, Node, NodeId},
    ty::Type,
};

/// When an assumed pair is forgotten.
pub(crate) trait Discipline {
    const NAME: &'static str;

    /// Whether a pair leaves the assumption set once its rule returns.
    const DISCHARGE: bool;
}

/// Both checkers behind one value, for callers that pick at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Inductive,
    Coinductive,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Inductive, Algorithm::Coinductive];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Inductive => inductive::Inductive::NAME,
            Algorithm::Coinductive => coinductive::Coinductive::NAME,
        }
    }

    pub fn subtype(self, left: &Type, right: &Type, cancel: &CancelFlag) -> bool {
        self.subtype_counted(left, right, cancel).0
    }

    pub fn subtype_counted(self, left: &Type, right: &Type, cancel: &CancelFlag) -> (bool, u64) {
        match self {
            Algorithm::Inductive => inductive::subtype_counted(left, right, cancel),
            Algorithm::Coinductive => coinductive::subtype_counted(left, right, cancel),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of a choice supplies the labels that must be matched.
#[derive(Clone, Copy)]
enum Required {
    Left,
    Right,
}

/// A pair whose rule is still relating its continuations.
struct Frame {
    pair: (NodeId, NodeId),
    /// Continuation pairs the rule still has to relate, in order.
    pending: Vec<(NodeId, NodeId)>,
    next: usize,
    /// `false` when the rule fails once `pending` is exhausted, as for a
    /// choice with a label the other side lacks.
    complete: bool,
}

enum Visit {
    Done(bool),
    Expand(Frame),
}

struct Checker<'t, D> {
    left: &'t Type,
    right: &'t Type,
    cancel: &'t CancelFlag,
    assumed: FxHashSet<(NodeId, NodeId)>,
    steps: u64,
    discipline: PhantomData<D>,
}

impl<'t, D: Discipline> Checker<'t, D> {
    fn new(left: &'t Type, right: &'t Type, cancel: &'t CancelFlag) -> Self {
        Self {
            left,
            right,
            cancel,
            assumed: FxHashSet::default(),
            steps: 0,
            discipline: PhantomData,
        }
    }

    /// Depth-first walk of the product graph on a heap stack, so the depth of
    /// a check is not bounded by the thread's stack.
    fn check(&mut self, n1: NodeId, n2: NodeId) -> bool {
        let mut stack = Vec::new();
        let mut holds = match self.visit(n1, n2) {
            Visit::Done(holds) => return holds,
            Visit::Expand(frame) => {
                stack.push(frame);
                true
            }
        };

        // `holds` is the verdict of the call that finished last
        while let Some(mut frame) = stack.pop() {
            let next = match holds {
                true => frame.pending.get(frame.next).copied(),
                false => None,
            };
            let Some((c1, c2)) = next else {
                holds &= frame.complete;
                if D::DISCHARGE {
                    self.assumed.remove(&frame.pair);
                }
                continue;
            };

            frame.next += 1;
            stack.push(frame);
            match self.visit(c1, c2) {
                Visit::Done(child) => holds = child,
                Visit::Expand(child) => {
                    stack.push(child);
                    holds = true;
                }
            }
        }
        holds
    }

    /// One rule evaluation. A rule that needs its continuations assumes the
    /// pair and hands them back as a frame.
    fn visit(&mut self, n1: NodeId, n2: NodeId) -> Visit {
        self.steps += 1;
        if self.cancel.is_cancelled() {
            return Visit::Done(false);
        }
        let pair = (n1, n2);
        if self.assumed.contains(&pair) {
            return Visit::Done(true);
        }

        let (pending, complete) = match (self.left.node(n1), self.right.node(n2)) {
            (Node::End, Node::End) => return Visit::Done(true),
            (
                Node::In { participant: p1, sort: s1, cont: c1 },
                Node::In { participant: p2, sort: s2, cont: c2 },
            ) => {
                if p1 != p2 || !s2.is_subsort(*s1) {
                    return Visit::Done(false);
                }
                (vec![(*c1, *c2)], true)
            }
            (
                Node::Out { participant: p1, sort: s1, cont: c1 },
                Node::Out { participant: p2, sort: s2, cont: c2 },
            ) => {
                if p1 != p2 || !s1.is_subsort(*s2) {
                    return Visit::Done(false);
                }
                (vec![(*c1, *c2)], true)
            }
            (
                Node::Branch { participant: p1, branches: b1 },
                Node::Branch { participant: p2, branches: b2 },
            ) => {
                if p1 != p2 {
                    return Visit::Done(false);
                }
                choice(b1, b2, Required::Left)
            }
            (
                Node::Select { participant: p1, branches: b1 },
                Node::Select { participant: p2, branches: b2 },
            ) => {
                if p1 != p2 {
                    return Visit::Done(false);
                }
                choice(b1, b2, Required::Right)
            }
            _ => return Visit::Done(false),
        };

        self.assumed.insert(pair);
        Visit::Expand(Frame { pair, pending, next: 0, complete })
    }
}

/// Pairs of continuations to relate left-to-right, one per label of the
/// `required` side, up to the first label the other side does not offer.
/// The flag is `false` if such a label exists.
fn choice(
    left: &[(Label, NodeId)],
    right: &[(Label, NodeId)],
    required: Required,
) -> (Vec<(NodeId, NodeId)>, bool) {
    let (needed, offered) = match required {
        Required::Left => (left, right),
        Required::Right => (right, left),
    };

    let mut pairs = Vec::with_capacity(needed.len());
    let mut offered = offered.iter().peekable();
    for &(label, need) in needed {
        while offered.next_if(|&&(l, _)| l < label).is_some() {}
        let Some(&(_, have)) = offered.next_if(|&&(l, _)| l == label) else {
            return (pairs, false);
        };
        pairs.push(match required {
            Required::Left => (need, have),
            Required::Right => (have, need),
        });
    }
    (pairs, true)
}

/// Runs one top-level check under discipline `D`, returning the verdict and
/// the number of rule evaluations.
fn run<D: Discipline>(left: &Type, right: &Type, cancel: &CancelFlag) -> (bool, u64) {
    let (Some(r1), Some(r2)) = (left.root(), right.root()) else {
        debug!(algorithm = D::NAME, "rootless type is never related");
        return (false, 0);
    };

    let mut checker = Checker::<D>::new(left, right, cancel);
    let verdict = checker.check(r1, r2);
    debug!(
        algorithm = D::NAME,
        left_nodes = left.len(),
        right_nodes = right.len(),
        steps = checker.steps,
        cancelled = cancel.is_cancelled(),
        verdict,
        "subtype check finished"
    );
    (verdict, checker.steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::Participant, sort::Sort};

    fn choice(select: bool, participant: Participant, labels: &[Label]) -> Type {
        let mut ty = Type::new();
        let end = ty.push(Node::End);
        let branches = labels.iter().map(|&l| (l, end)).collect();
        let root = ty.push(if select {
            Node::Select { participant, branches }
        } else {
            Node::Branch { participant, branches }
        });
        ty.set_root(root);
        ty
    }

    fn message(send: bool, participant: Participant, sort: Sort) -> Type {
        let mut ty = Type::new();
        let cont = ty.push(Node::End);
        let root = ty.push(if send {
            Node::Out { participant, sort, cont }
        } else {
            Node::In { participant, sort, cont }
        });
        ty.set_root(root);
        ty
    }

    fn both(left: &Type, right: &Type) -> [bool; 2] {
        let cancel = CancelFlag::new();
        Algorithm::ALL.map(|algorithm| algorithm.subtype(left, right, &cancel))
    }

    #[test]
    fn fewer_offered_branches_is_a_subtype() {
        let narrow = choice(false, 0, &[0]);
        let wide = choice(false, 0, &[0, 1]);
        assert_eq!(both(&narrow, &wide), [true, true]);
        assert_eq!(both(&wide, &narrow), [false, false]);
    }

    #[test]
    fn more_selectable_options_is_a_subtype() {
        let narrow = choice(true, 0, &[0]);
        let wide = choice(true, 0, &[0, 1]);
        assert_eq!(both(&wide, &narrow), [true, true]);
        assert_eq!(both(&narrow, &wide), [false, false]);
    }

    #[test]
    fn merge_scan_skips_unmatched_labels() {
        let sparse = choice(false, 3, &[1, 4, 9]);
        let dense = choice(false, 3, &[0, 1, 2, 4, 5, 9, 12]);
        assert_eq!(both(&sparse, &dense), [true, true]);

        let gap = choice(false, 3, &[1, 3]);
        assert_eq!(both(&gap, &dense), [false, false]);
    }

    #[test]
    fn receive_is_contravariant_in_its_payload() {
        let nat = message(false, 1, Sort::Nat);
        let int = message(false, 1, Sort::Int);
        assert_eq!(both(&int, &nat), [true, true]);
        assert_eq!(both(&nat, &int), [false, false]);
    }

    #[test]
    fn send_is_covariant_in_its_payload() {
        let nat = message(true, 1, Sort::Nat);
        let int = message(true, 1, Sort::Int);
        assert_eq!(both(&nat, &int), [true, true]);
        assert_eq!(both(&int, &nat), [false, false]);
        let boolean = message(true, 1, Sort::Bool);
        assert_eq!(both(&boolean, &int), [false, false]);
    }

    #[test]
    fn participants_must_agree() {
        for (a, b) in [
            (message(true, 0, Sort::Int), message(true, 1, Sort::Int)),
            (message(false, 0, Sort::Int), message(false, 1, Sort::Int)),
            (choice(false, 0, &[0]), choice(false, 1, &[0])),
            (choice(true, 0, &[0]), choice(true, 1, &[0])),
        ] {
            assert_eq!(both(&a, &b), [false, false]);
            assert_eq!(both(&b, &a), [false, false]);
        }
    }

    #[test]
    fn mismatched_kinds_never_relate() {
        let kinds = [
            message(true, 0, Sort::Int),
            message(false, 0, Sort::Int),
            choice(false, 0, &[0]),
            choice(true, 0, &[0]),
        ];
        let mut end = Type::new();
        let root = end.push(Node::End);
        end.set_root(root);

        for (i, a) in kinds.iter().enumerate() {
            assert_eq!(both(a, &end), [false, false]);
            assert_eq!(both(&end, a), [false, false]);
            for (j, b) in kinds.iter().enumerate() {
                if i != j {
                    assert_eq!(both(a, b), [false, false], "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn cancelled_check_answers_false_without_recursing() {
        let ty = choice(false, 0, &[0, 1]);
        let cancel = CancelFlag::new();
        cancel.cancel();
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.subtype_counted(&ty, &ty, &cancel), (false, 1));
        }
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn rootless_types_are_unrelated() {
        let ty = choice(false, 0, &[0]);
        assert_eq!(both(&Type::new(), &ty), [false, false]);
        assert_eq!(both(&ty, &Type::new()), [false, false]);
    }

    #[test]
    fn long_chains_check_without_deep_recursion() {
        let chain = |sort| {
            let mut ty = Type::new();
            let mut cont = ty.push(Node::End);
            for _ in 0..50_000 {
                cont = ty.push(Node::In { participant: 0, sort, cont });
            }
            ty.set_root(cont);
            ty
        };
        let (int, nat) = (chain(Sort::Int), chain(Sort::Nat));
        let cancel = CancelFlag::new();
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.subtype_counted(&int, &nat, &cancel), (true, 50_001));
            assert_eq!(algorithm.subtype_counted(&nat, &int, &cancel), (false, 1));
        }
    }

    #[test]
    fn failed_branch_stops_the_remaining_ones() {
        // p0⊕{l0: p1?[Nat];end, l1: end} against p0⊕{l0: p1?[Int];end, l1: end}
        let side = |sort| {
            let mut ty = Type::new();
            let end = ty.push(Node::End);
            let recv = ty.push(Node::In { participant: 1, sort, cont: end });
            let root = ty.push(Node::Branch { participant: 0, branches: vec![(0, recv), (1, end)] });
            ty.set_root(root);
            ty
        };
        let cancel = CancelFlag::new();
        for algorithm in Algorithm::ALL {
            let (holds, steps) = algorithm.subtype_counted(&side(Sort::Nat), &side(Sort::Int), &cancel);
            assert!(!holds);
            // the root, then the receive that fails; l1 is never visited
            assert_eq!(steps, 2);
        }
    }

    #[test]
    fn algorithms_display_their_names() {
        assert_eq!(Algorithm::Inductive.to_string(), "inductive");
        assert_eq!(Algorithm::Coinductive.to_string(), "coinductive");
    }
}
