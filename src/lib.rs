//! Session types describe communication protocols: what a participant sends and
//! receives, which choices it offers or makes, and when it stops. Protocols that
//! run forever are written with recursion, `μX. …X…`, and are naturally stored
//! as **cyclic graphs**, one node per action.
//!
//! This crate decides **subtyping** between such graphs. `S <: T` means that a
//! process following `S` can be used wherever `T` is expected:
//!
//! - **Receives are contravariant** -- `p?[Int];end <: p?[Nat];end`, since
//!   accepting any integer is at least as good as accepting naturals.
//! - **Sends are covariant** -- `p![Nat];end <: p![Int];end`.
//! - **Offering fewer branches is safer** -- `p⊕{l0: end} <: p⊕{l0: end, l1: end}`.
//! - **Supporting more selections is safer** -- `p&{l0: end, l1: end} <: p&{l0: end}`.
//!
//! Two decision procedures share one graph representation. They differ only in
//! how they treat a pair of nodes they have met before, which turns out to
//! matter a great deal for their running time.
//!
//! # Building types
//!
//! A [`Type`] is an arena of [`Node`]s plus a root. Continuations are plain
//! [`NodeId`]s into the same arena, so a cycle is just an edge back to an
//! earlier node.
//!
//! ```
//! use session_subtyping::{Node, Sort, Type};
//!
//! // μX. p0?[Int]; p1⊕{l0: X, l1: end}
//! let mut ty = Type::new();
//! let root = ty.push(Node::End);
//! let end = ty.push(Node::End);
//! let choice = ty.push(Node::Branch { participant: 1, branches: vec![(0, root), (1, end)] });
//! *ty.node_mut(root) = Node::In { participant: 0, sort: Sort::Int, cont: choice };
//! ty.set_root(root);
//!
//! assert_eq!(ty.to_string(), "μX.p0?[Int];p1⊕{l0: X, l1: end}");
//! ```
//!
//! Writing the binders out is often easier. [`Type::from_recursive`] turns a
//! [`Recursive`] term into the same graph, resolving every occurrence of a
//! variable to the one node its `μ` names:
//!
//! ```
//! use session_subtyping::{Recursive, Sort, Type};
//!
//! let term = Recursive::mu(0, Recursive::recv(0, Sort::Int, Recursive::branch(1, vec![
//!     (0, Recursive::var(0)),
//!     (1, Recursive::End),
//! ])));
//! let ty = Type::from_recursive(&term)?;
//! assert_eq!(ty.to_string(), "μX.p0?[Int];p1⊕{l0: X, l1: end}");
//! # Ok::<(), session_subtyping::TranslateError>(())
//! ```
//!
//! # Checking
//!
//! Both checkers walk the two graphs together, remembering pairs of nodes they
//! assume related. Meeting an assumed pair again closes a cycle.
//!
//! - [`inductive`] remembers a pair only while the rule that introduced it is
//!   on the stack. Simple, but a pair reached along many paths is derived again
//!   on each of them, which is exponential on some graphs.
//! - [`coinductive`] remembers every pair until the check ends. Each pair is
//!   expanded at most once.
//!
//! ```
//! use session_subtyping::{coinductive, inductive, CancelFlag, Recursive, Sort, Type};
//!
//! let wide = Type::from_recursive(&Recursive::mu(0, Recursive::recv(0, Sort::Int, Recursive::var(0))))?;
//! let narrow = Type::from_recursive(&Recursive::mu(0, Recursive::recv(0, Sort::Nat, Recursive::var(0))))?;
//!
//! let cancel = CancelFlag::new();
//! assert!(inductive::subtype(&wide, &narrow, &cancel));
//! assert!(coinductive::subtype(&wide, &narrow, &cancel));
//! assert!(!coinductive::subtype(&narrow, &wide, &cancel));
//! # Ok::<(), session_subtyping::TranslateError>(())
//! ```
//!
//! [`Algorithm`] puts both behind one value, and the `subtype_counted` variants
//! also report how many rules were evaluated.
//!
//! # Deadlines
//!
//! Checks are synchronous and may run for a long time. Every rule evaluation
//! first polls a [`CancelFlag`]; once it is set, the check unwinds with `false`,
//! which then means "unknown" rather than "not a subtype". The [runtimes]
//! module runs a check on a worker, sets the flag when a deadline passes and
//! always waits for the worker to finish.
//!
//! ```
//! use std::time::Duration;
//! use session_subtyping::{runtimes, Algorithm, Node, Type};
//!
//! let mut ty = Type::new();
//! let root = ty.push(Node::End);
//! *ty.node_mut(root) = Node::Branch { participant: 0, branches: vec![(0, root)] };
//! ty.set_root(root);
//!
//! let run = runtimes::check_with_deadline(Algorithm::Coinductive, &ty, &ty, Duration::from_secs(5));
//! assert_eq!(run.verdict(), Some(true));
//! ```
//!
//! With the `runtime-tokio` feature the same supervision is available as a
//! future, see [`runtimes::tokio`].
//!
//! # Unfolding
//!
//! [`unfold_once`] unrolls a type one step at its root. The result is a
//! different graph describing the same protocol, so both checkers should relate
//! it to the original in both directions. This makes it a convenient source of
//! test inputs.
//!
//! # Features
//!
//! - `runtime-tokio` -- the async supervisor in [`runtimes::tokio`].
//! - `generate` -- random and adversarial type families in `generate`.
//! - `harness` (default) -- the `subtyping-bench` timing binary.

pub mod cancel;
#[cfg(feature = "generate")]
pub mod generate;
pub mod graph;
pub mod recursive;
pub mod render;
pub mod runtimes;
pub mod sort;
pub mod subtyping;
pub mod ty;
pub mod unfold;

pub use cancel::CancelFlag;
pub use graph::{Label, Node, NodeId, Participant};
pub use recursive::{Recursive, TranslateError, Var};
pub use runtimes::Supervised;
pub use sort::Sort;
pub use subtyping::{coinductive, inductive, Algorithm};
pub use ty::{Mapping, Type};
pub use unfold::unfold_once;
