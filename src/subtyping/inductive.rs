//! Subtyping with assumptions scoped to the current path.
//!
//! A pair `(n₁, n₂)` is assumed related only while the rule that introduced it
//! is still running. Once that rule returns, successfully or not, the pair is
//! discharged, and meeting it again on another path derives it from scratch.
//! Cycles are closed only against ancestors on that path.
//!
//! The price is re-derivation. Graphs where many paths reach the same pair
//! make the number of rule evaluations exponential, see
//! [`exponential_counterexample`](crate::generate::exponential_counterexample).

use super::{run, Discipline};
use crate::{cancel::CancelFlag, ty::Type};

pub(crate) struct Inductive;

impl Discipline for Inductive {
    const NAME: &'static str = "inductive";
    const DISCHARGE: bool = true;
}

/// Whether the root of `left` is a subtype of the root of `right`.
///
/// Answers `false` as soon as `cancel` is observed set.
pub fn subtype(left: &Type, right: &Type, cancel: &CancelFlag) -> bool {
    subtype_counted(left, right, cancel).0
}

/// Like [`subtype`], also returning the number of rule evaluations.
pub fn subtype_counted(left: &Type, right: &Type, cancel: &CancelFlag) -> (bool, u64) {
    run::<Inductive>(left, right, cancel)
}
