//! The arena that owns one session-type graph.

use crate::graph::{Node, NodeId};

/// A session type: an arena of [`Node`]s plus a distinguished root.
///
/// A `Type` exclusively owns every node it lists, reachable from the root or
/// not. Nodes never point into another arena, so two `Type`s never share node
/// identities. [`Clone`] is a full deep copy for the same reason: the checkers
/// detect cycles by identity, so a clone must not alias its original.
///
/// The arena performs no validation. Callers building a `Type` by hand keep
/// branch labels strictly ascending and every [`NodeId`] in bounds.
///
/// ```
/// use session_subtyping::{Node, Type};
///
/// // μX. p0⊕{l0: X}
/// let mut ty = Type::new();
/// let root = ty.push(Node::End);
/// *ty.node_mut(root) = Node::Branch { participant: 0, branches: vec![(0, root)] };
/// ty.set_root(root);
///
/// assert_eq!(ty.to_string(), "μX.p0⊕{l0: X}");
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Type {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

/// Old-to-new node identities produced by [`Type::append_copy`].
///
/// A copy appends the source arena as one contiguous block, so the table is
/// the shift of that block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    offset: usize,
    len: usize,
}

impl Mapping {
    /// Image of a source node in the destination arena.
    pub fn get(&self, old: NodeId) -> NodeId {
        debug_assert!(old.index() < self.len, "{old} is not in the copied arena");
        NodeId::new(old.index() + self.offset)
    }

    /// Identities of the copied nodes in the destination arena.
    pub fn targets(&self) -> impl Iterator<Item = NodeId> {
        (self.offset..self.offset + self.len).map(NodeId::new)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Type {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` to the arena. Its continuations may name nodes that are
    /// pushed later, which allows building cycles.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// All nodes in arena order, including the ones unreachable from the root.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::new(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deep-copies every node of `source` into the end of this arena and
    /// remaps all of the copies' references into the new block.
    ///
    /// With `rooted` the root of this arena becomes the image of the source
    /// root. Without it the root is left alone and the caller splices
    /// [`Mapping::get`] of the source root wherever it belongs.
    pub fn append_copy(&mut self, source: &Type, rooted: bool) -> Mapping {
        let mapping = Mapping {
            offset: self.nodes.len(),
            len: source.nodes.len(),
        };
        self.nodes.reserve(source.nodes.len());
        for node in &source.nodes {
            let mut copy = node.clone();
            copy.remap(|old| mapping.get(old));
            self.nodes.push(copy);
        }
        if rooted {
            self.root = source.root.map(|root| mapping.get(root));
        }
        mapping
    }

    /// Releases every node and forgets the root. A no-op on an empty arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }
}

impl Clone for Type {
    fn clone(&self) -> Self {
        let mut copy = Type::new();
        copy.append_copy(self, true);
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.append_copy(source, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Sort;

    fn ping() -> Type {
        // μX. p1![Nat];p1?[Bool];X
        let mut ty = Type::new();
        let send = ty.push(Node::End);
        let recv = ty.push(Node::In { participant: 1, sort: Sort::Bool, cont: send });
        *ty.node_mut(send) = Node::Out { participant: 1, sort: Sort::Nat, cont: recv };
        ty.set_root(send);
        ty
    }

    #[test]
    fn clone_is_structurally_equal() {
        let ty = ping();
        let copy = ty.clone();
        assert_eq!(copy, ty);
        assert_eq!(copy.root(), ty.root());
    }

    #[test]
    fn unrooted_copy_appends_after_existing_nodes() {
        let source = ping();
        let mut target = ping();
        let mapping = target.append_copy(&source, false);

        assert_eq!(target.len(), 4);
        assert_eq!(target.root(), Some(NodeId::new(0)));
        assert_eq!(mapping.get(NodeId::new(0)), NodeId::new(2));
        assert_eq!(mapping.targets().collect::<Vec<_>>(), vec![NodeId::new(2), NodeId::new(3)]);

        // the copied cycle is closed inside the copy, not through the originals
        let copied_root = mapping.get(source.root().unwrap());
        let next = target.node(copied_root).successors().next().unwrap();
        assert_eq!(next, NodeId::new(3));
        assert_eq!(target.node(next).successors().next(), Some(copied_root));
    }

    #[test]
    fn rooted_copy_moves_the_root() {
        let source = ping();
        let mut target = Type::new();
        target.push(Node::End);
        target.append_copy(&source, true);
        assert_eq!(target.root(), Some(NodeId::new(1)));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut ty = ping();
        ty.clear();
        assert!(ty.is_empty());
        assert_eq!(ty.root(), None);
        ty.clear();
        assert_eq!(ty, Type::new());
    }

    #[test]
    fn clone_from_replaces_previous_contents() {
        let mut target = Type::new();
        target.push(Node::End);
        target.push(Node::End);
        target.clone_from(&ping());
        assert_eq!(target, ping());
    }
}
