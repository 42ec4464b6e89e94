//! Random and structured families of session-type graphs.
//!
//! Every generator takes a [`fastrand::Rng`] so runs are reproducible from a
//! seed.

use fastrand::Rng;

use crate::{
    graph::{Label, Node, NodeId, Participant},
    sort::Sort,
    ty::Type,
};

/// Shape of the types produced by [`random_type`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Upper bound on the number of nodes.
    pub max_size: usize,
    /// Labels are drawn from `0..branching_factor`, which also caps the width
    /// of a choice.
    pub branching_factor: u32,
    /// Whether leaves may loop back to an ancestor instead of ending.
    pub recursive: bool,
    /// Participants are drawn from `0..participants`.
    pub participants: Participant,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            branching_factor: 4,
            recursive: true,
            participants: 2,
        }
    }
}

/// A random type of at most `config.max_size` nodes.
///
/// Non-leaf nodes are one of receive, send, branch or select, chosen
/// uniformly. A choice splits what is left of the size budget between its
/// continuations. With `recursive` set, a leaf is a back edge to a random
/// node on the path from the root half of the time, and `end` otherwise.
///
/// # Panics
///
/// If `participants` or `branching_factor` is zero.
pub fn random_type(config: &GeneratorConfig, rng: &mut Rng) -> Type {
    assert!(config.participants > 0, "at least one participant is needed");
    assert!(config.branching_factor > 0, "branching factor must be positive");

    let mut generator = Generator {
        config,
        rng,
        ty: Type::new(),
        ancestors: Vec::new(),
    };
    let root = generator.node(config.max_size);
    generator.ty.set_root(root);
    generator.ty
}

struct Generator<'a> {
    config: &'a GeneratorConfig,
    rng: &'a mut Rng,
    ty: Type,
    ancestors: Vec<NodeId>,
}

impl Generator<'_> {
    fn node(&mut self, size: usize) -> NodeId {
        if size <= 1 {
            return self.leaf();
        }

        let participant = self.rng.u32(..self.config.participants);
        let id = self.ty.push(Node::End);
        self.ancestors.push(id);
        let node = match self.rng.u8(..4) {
            0 => Node::In {
                participant,
                sort: self.sort(),
                cont: self.node(size - 1),
            },
            1 => Node::Out {
                participant,
                sort: self.sort(),
                cont: self.node(size - 1),
            },
            2 => Node::Branch {
                participant,
                branches: self.branches(size),
            },
            _ => Node::Select {
                participant,
                branches: self.branches(size),
            },
        };
        self.ancestors.pop();
        *self.ty.node_mut(id) = node;
        id
    }

    fn leaf(&mut self) -> NodeId {
        if self.config.recursive && !self.ancestors.is_empty() && self.rng.bool() {
            self.ancestors[self.rng.usize(..self.ancestors.len())]
        } else {
            self.ty.push(Node::End)
        }
    }

    fn sort(&mut self) -> Sort {
        Sort::ALL[self.rng.usize(..Sort::ALL.len())]
    }

    /// Continuations of a choice node of `size`, sorted by label.
    fn branches(&mut self, size: usize) -> Vec<(Label, NodeId)> {
        let factor = self.config.branching_factor as usize;
        let count = 1 + self.rng.usize(..(size - 1).min(factor));
        let labels = sample(self.rng, count, factor);

        // distinct cut points in 1..size-1 give every branch at least one node
        let mut cuts = sample(self.rng, count - 1, size - 2)
            .into_iter()
            .map(|cut| cut + 1)
            .collect::<Vec<_>>();
        cuts.sort_unstable();
        cuts.insert(0, 0);
        cuts.push(size - 1);

        let mut branches = labels
            .into_iter()
            .zip(cuts.windows(2))
            .map(|(label, cut)| (label as Label, self.node(cut[1] - cut[0])))
            .collect::<Vec<_>>();
        branches.sort_unstable_by_key(|&(label, _)| label);
        branches
    }
}

/// `count` distinct values from `0..bound`.
fn sample(rng: &mut Rng, count: usize, bound: usize) -> Vec<usize> {
    debug_assert!(count <= bound);
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let value = rng.usize(..bound);
        if !picked.contains(&value) {
            picked.push(value);
        }
    }
    picked
}

/// The `k`-th member of a family on which the inductive checker needs
/// exponentially many rule evaluations, while the coinductive one stays
/// polynomial.
///
/// All nodes are branches of participant 0. A main cycle of `k` nodes is
/// linked by label `1` back to the root. Label `2` of cycle node `i` starts a
/// side chain of `k - 1 - i` nodes that rejoins the root by label `1`, with
/// every chain node also offering label `2` into a self-looping sink. The last
/// cycle node has no chain, its label `2` goes straight to the root.
///
/// Checking `exponential_counterexample(k)` against
/// `exponential_counterexample(k + 1)` holds, and shows the blow-up.
///
/// # Panics
///
/// If `k` is zero.
pub fn exponential_counterexample(k: usize) -> Type {
    assert!(k >= 1, "the family starts at k = 1");

    let mut ty = Type::new();
    let cycle = (0..k).map(|_| push_branch(&mut ty)).collect::<Vec<_>>();
    let root = cycle[0];
    for pair in cycle.windows(2) {
        link(&mut ty, pair[0], 1, pair[1]);
    }
    link(&mut ty, cycle[k - 1], 1, root);

    let sink = push_branch(&mut ty);
    link(&mut ty, sink, 1, sink);
    link(&mut ty, sink, 2, sink);

    for (i, &node) in cycle.iter().enumerate() {
        if i == k - 1 {
            link(&mut ty, node, 2, root);
            continue;
        }
        let mut current = push_branch(&mut ty);
        link(&mut ty, node, 2, current);
        for _ in i + 2..k {
            let next = push_branch(&mut ty);
            link(&mut ty, current, 1, next);
            link(&mut ty, current, 2, sink);
            current = next;
        }
        link(&mut ty, current, 1, root);
        link(&mut ty, current, 2, sink);
    }

    ty.set_root(root);
    ty
}

fn push_branch(ty: &mut Type) -> NodeId {
    ty.push(Node::Branch { participant: 0, branches: Vec::new() })
}

fn link(ty: &mut Type, from: NodeId, label: Label, to: NodeId) {
    match ty.node_mut(from) {
        Node::Branch { branches, .. } => branches.push((label, to)),
        node => unreachable!("linking from non-branch {node:?}"),
    }
}

/// A random binary tree of `nodes` branches `p0⊕{l0: _, l1: _}` whose open
/// ends all loop back to the root.
///
/// Whatever its shape, the result is coinductively equal to
/// `μX. p0⊕{l0: X, l1: X}`.
///
/// # Panics
///
/// If `nodes` is zero.
pub fn random_isomorphic_type(nodes: usize, rng: &mut Rng) -> Type {
    assert!(nodes >= 1, "at least one node is needed");

    // the first node is the root, so a fresh node points at the root until
    // one of its open ends is filled
    let open = || Node::Branch {
        participant: 0,
        branches: vec![(0, NodeId::new(0)), (1, NodeId::new(0))],
    };

    let mut ty = Type::new();
    let root = ty.push(open());
    let mut leaves = vec![(root, 0), (root, 1)];
    for _ in 1..nodes {
        let id = ty.push(open());
        let (parent, slot) = leaves.remove(rng.usize(..leaves.len()));
        *ty.node_mut(parent).successors_mut()[slot] = id;
        leaves.push((id, 0));
        leaves.push((id, 1));
    }

    ty.set_root(root);
    ty
}
