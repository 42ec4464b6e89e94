//! Textual rendering of a [`Type`], reintroducing recursion binders.
//!
//! A node that is reached again while it is still on the current path gets a
//! variable name, and its own rendering is prefixed with `μ<name>.`. Names are
//! drawn from [`VARIABLES`] in order and wrap around once exhausted. Nodes that
//! are shared but not cyclic are simply printed once per path.

use std::fmt::{self, Write};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{Label, Node, NodeId, Participant};
use crate::ty::Type;

pub const VARIABLES: &str = "XYZWVUTSRQPONMLKJIHGFEDCBA";

/// A node whose continuations are still being written.
struct Frame {
    id: NodeId,
    /// Where the node's text starts in the output, for a late binder.
    start: usize,
    pending: Vec<(Option<Label>, NodeId)>,
    next: usize,
    close: &'static str,
}

struct Renderer<'t> {
    ty: &'t Type,
    out: String,
    on_path: FxHashSet<NodeId>,
    names: FxHashMap<NodeId, char>,
    next_name: usize,
}

impl<'t> Renderer<'t> {
    fn new(ty: &'t Type) -> Self {
        Self {
            ty,
            out: String::new(),
            on_path: FxHashSet::default(),
            names: FxHashMap::default(),
            next_name: 0,
        }
    }

    fn name(&mut self, id: NodeId) -> char {
        if let Some(&name) = self.names.get(&id) {
            return name;
        }
        let alphabet = VARIABLES.as_bytes();
        let name = char::from(alphabet[self.next_name % alphabet.len()]);
        self.next_name += 1;
        self.names.insert(id, name);
        name
    }

    /// Depth-first over an explicit stack, so long chains render on any thread.
    fn render(mut self, root: NodeId) -> String {
        let mut stack = Vec::new();
        self.enter(root, &mut stack);

        while let Some(mut frame) = stack.pop() {
            let Some((label, next)) = frame.pending.get(frame.next).copied() else {
                self.out.push_str(frame.close);
                self.exit(frame.id, frame.start);
                continue;
            };
            if let Some(label) = label {
                if frame.next > 0 {
                    self.out.push_str(", ");
                }
                let _ = write!(self.out, "l{label}: ");
            }
            frame.next += 1;
            stack.push(frame);
            self.enter(next, &mut stack);
        }
        self.out
    }

    /// Writes the node's own text, and pushes a frame if it has continuations.
    fn enter(&mut self, id: NodeId, stack: &mut Vec<Frame>) {
        if self.on_path.contains(&id) {
            let name = self.name(id);
            self.out.push(name);
            return;
        }
        self.on_path.insert(id);

        let ty = self.ty;
        let start = self.out.len();
        let (pending, close) = match ty.node(id) {
            Node::End => {
                self.out.push_str("end");
                self.exit(id, start);
                return;
            }
            Node::In { participant, sort, cont } => {
                let _ = write!(self.out, "p{participant}?[{sort}];");
                (vec![(None, *cont)], "")
            }
            Node::Out { participant, sort, cont } => {
                let _ = write!(self.out, "p{participant}![{sort}];");
                (vec![(None, *cont)], "")
            }
            Node::Branch { participant, branches } => self.choice(*participant, '⊕', branches),
            Node::Select { participant, branches } => self.choice(*participant, '&', branches),
        };
        stack.push(Frame { id, start, pending, next: 0, close });
    }

    fn choice(
        &mut self,
        participant: Participant,
        symbol: char,
        branches: &[(Label, NodeId)],
    ) -> (Vec<(Option<Label>, NodeId)>, &'static str) {
        let _ = write!(self.out, "p{participant}{symbol}{{");
        let pending = branches.iter().map(|&(label, next)| (Some(label), next)).collect();
        (pending, "}")
    }

    /// A node named while it was on the path gets its binder now.
    fn exit(&mut self, id: NodeId, start: usize) {
        if let Some(name) = self.names.get(&id) {
            self.out.insert_str(start, &format!("μ{name}."));
        }
        self.on_path.remove(&id);
    }
}

impl Type {
    /// Human-readable dump for debugging. Deterministic for a given arena, but
    /// not a canonical form: structurally equal types may render differently.
    pub fn render(&self) -> String {
        match self.root() {
            Some(root) => Renderer::new(self).render(root),
            None => String::new(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
