//! One-step unrolling of a recursive session type at its root.

use tracing::debug;

use crate::ty::Type;

/// Unrolls `ty` once: every edge that points back at the root is redirected
/// to the root of a fresh copy of the whole of `ty`.
///
/// The result is a new arena whose root is a copy of the original root. Each
/// back edge gets its own copy, so a type with `k` edges into its root unfolds
/// into `k + 1` copies of its arena. Copies are never shared. The result is
/// coinductively equivalent to `ty`.
///
/// ```
/// use session_subtyping::{coinductive, unfold_once, CancelFlag, Node, Type};
///
/// let mut ty = Type::new();
/// let root = ty.push(Node::End);
/// *ty.node_mut(root) = Node::Branch { participant: 0, branches: vec![(0, root)] };
/// ty.set_root(root);
///
/// let unfolded = unfold_once(&ty);
/// assert_eq!(unfolded.to_string(), "p0⊕{l0: μX.p0⊕{l0: X}}");
///
/// let cancel = CancelFlag::new();
/// assert!(coinductive::subtype(&ty, &unfolded, &cancel));
/// assert!(coinductive::subtype(&unfolded, &ty, &cancel));
/// ```
pub fn unfold_once(ty: &Type) -> Type {
    let mut unfolded = Type::new();
    let first = unfolded.append_copy(ty, true);
    let (Some(old_root), Some(root)) = (ty.root(), unfolded.root()) else {
        return unfolded;
    };

    let mut spliced = 0;
    for id in first.targets() {
        let back_edges = unfolded
            .node(id)
            .successors()
            .enumerate()
            .filter(|&(_, next)| next == root)
            .map(|(slot, _)| slot)
            .collect::<Vec<_>>();

        for slot in back_edges {
            let copy = unfolded.append_copy(ty, false);
            *unfolded.node_mut(id).successors_mut()[slot] = copy.get(old_root);
            spliced += 1;
        }
    }

    debug!(
        nodes = ty.len(),
        copies = spliced,
        unfolded_nodes = unfolded.len(),
        "unfolded type at its root"
    );
    unfolded
}
