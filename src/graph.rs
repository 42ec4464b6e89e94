//! Nodes of a session-type graph.
//!
//! A node holds exactly one action together with the identities of the nodes it
//! continues with. Identities are [`NodeId`]s, indices into the arena of the
//! [`Type`](crate::Type) that owns the node. They carry no ownership, so a
//! continuation may point anywhere in the same arena, including back at an
//! ancestor or at the node itself. This is how recursive protocols are
//! represented.

use std::fmt;

use crate::sort::Sort;

/// The communication peer of an action.
pub type Participant = u32;

/// A branch label. Labels inside one [`Node::Branch`] or [`Node::Select`] are
/// unique and strictly ascending.
pub type Label = u32;

/// Identity of a node inside one arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// # Panics
    ///
    /// If `index` does not fit in 32 bits.
    pub const fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "node index exceeds the u32 id space");
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    End,
    /// Receive a `sort` from `participant`, then continue.
    In {
        participant: Participant,
        sort: Sort,
        cont: NodeId,
    },
    /// Send a `sort` to `participant`, then continue.
    Out {
        participant: Participant,
        sort: Sort,
        cont: NodeId,
    },
    /// Offer one of the labeled continuations to `participant`.
    Branch {
        participant: Participant,
        branches: Vec<(Label, NodeId)>,
    },
    /// Support whichever labeled continuation `participant` picks.
    Select {
        participant: Participant,
        branches: Vec<(Label, NodeId)>,
    },
}

impl Node {
    /// Every outgoing reference, in order: the continuation of `In`/`Out`, or
    /// the branch targets of `Branch`/`Select` by ascending label.
    pub fn successors(&self) -> impl Iterator<Item = NodeId> + '_ {
        let (single, many) = match self {
            Node::End => (None, &[][..]),
            Node::In { cont, .. } | Node::Out { cont, .. } => (Some(*cont), &[][..]),
            Node::Branch { branches, .. } | Node::Select { branches, .. } => {
                (None, branches.as_slice())
            }
        };
        single.into_iter().chain(many.iter().map(|&(_, next)| next))
    }

    /// Mutable access to every outgoing reference, in the same order as
    /// [`successors`](Self::successors).
    pub fn successors_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            Node::End => Vec::new(),
            Node::In { cont, .. } | Node::Out { cont, .. } => vec![cont],
            Node::Branch { branches, .. } | Node::Select { branches, .. } => {
                branches.iter_mut().map(|(_, next)| next).collect()
            }
        }
    }

    /// Rewrites every outgoing reference through `map`.
    pub fn remap(&mut self, mut map: impl FnMut(NodeId) -> NodeId) {
        for next in self.successors_mut() {
            *next = map(*next);
        }
    }

    pub fn participant(&self) -> Option<Participant> {
        match self {
            Node::End => None,
            Node::In { participant, .. }
            | Node::Out { participant, .. }
            | Node::Branch { participant, .. }
            | Node::Select { participant, .. } => Some(*participant),
        }
    }
}
