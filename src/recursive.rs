//! Binder-based session types, and their translation into cyclic graphs.
//!
//! A [`Recursive`] term writes recursion explicitly: `μX. S` binds `X` and a
//! [`Recursive::Var`] continues the nearest enclosing binding. Translation
//! turns every binder into sharing. A `μ` binds the first action node below
//! it, and each occurrence of its variable becomes an edge back to that very
//! node, so two occurrences of `X` always resolve to the same [`NodeId`].
//!
//! ```
//! use session_subtyping::{Recursive, Sort, Type};
//!
//! // μX. p0⊕{l0: p1![Nat];X, l1: end}
//! let term = Recursive::mu(0, Recursive::branch(0, vec![
//!     (0, Recursive::send(1, Sort::Nat, Recursive::var(0))),
//!     (1, Recursive::End),
//! ]));
//! let ty = Type::from_recursive(&term)?;
//! assert_eq!(ty.to_string(), "μX.p0⊕{l0: p1![Nat];X, l1: end}");
//! # Ok::<(), session_subtyping::TranslateError>(())
//! ```

use thiserror::Error;

use crate::{
    graph::{Label, Node, NodeId, Participant},
    sort::Sort,
    ty::Type,
};

/// A recursion variable.
pub type Var = u32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recursive {
    End,
    In {
        participant: Participant,
        sort: Sort,
        cont: Box<Recursive>,
    },
    Out {
        participant: Participant,
        sort: Sort,
        cont: Box<Recursive>,
    },
    Branch {
        participant: Participant,
        branches: Vec<(Label, Recursive)>,
    },
    Select {
        participant: Participant,
        branches: Vec<(Label, Recursive)>,
    },
    Mu {
        var: Var,
        body: Box<Recursive>,
    },
    Var(Var),
}

impl Recursive {
    pub fn recv(participant: Participant, sort: Sort, cont: Recursive) -> Self {
        Recursive::In { participant, sort, cont: Box::new(cont) }
    }

    pub fn send(participant: Participant, sort: Sort, cont: Recursive) -> Self {
        Recursive::Out { participant, sort, cont: Box::new(cont) }
    }

    pub fn branch(participant: Participant, branches: Vec<(Label, Recursive)>) -> Self {
        Recursive::Branch { participant, branches }
    }

    pub fn select(participant: Participant, branches: Vec<(Label, Recursive)>) -> Self {
        Recursive::Select { participant, branches }
    }

    pub fn mu(var: Var, body: Recursive) -> Self {
        Recursive::Mu { var, body: Box::new(body) }
    }

    pub fn var(var: Var) -> Self {
        Recursive::Var(var)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("recursion variable {0} is not bound by an enclosing μ")]
    UnboundVariable(Var),

    /// `μX. X`, possibly through further binders: the variable would denote a
    /// node that does not exist yet.
    #[error("recursion variable {0} occurs before any action below its μ")]
    UnguardedVariable(Var),

    #[error("labels of participant {participant}'s choice are not strictly ascending: {labels:?}")]
    UnsortedLabels {
        participant: Participant,
        labels: Vec<Label>,
    },
}

struct Translator {
    ty: Type,
    /// Innermost binding last, so shadowing resolves to the nearest μ.
    bindings: Vec<(Var, NodeId)>,
}

impl Translator {
    /// `pending` holds the variables of the μ chain directly above `term`,
    /// still waiting for the node they will name.
    fn translate(&mut self, term: &Recursive, pending: &[Var]) -> Result<NodeId, TranslateError> {
        match term {
            Recursive::End => Ok(self.ty.push(Node::End)),
            Recursive::Mu { var, body } => {
                let mut pending = pending.to_vec();
                pending.push(*var);
                self.translate(body, &pending)
            }
            Recursive::Var(var) => {
                if pending.contains(var) {
                    return Err(TranslateError::UnguardedVariable(*var));
                }
                self.bindings
                    .iter()
                    .rev()
                    .find(|(bound, _)| bound == var)
                    .map(|&(_, id)| id)
                    .ok_or(TranslateError::UnboundVariable(*var))
            }
            Recursive::In { participant, sort, cont } => {
                let (participant, sort) = (*participant, *sort);
                self.action(pending, |t| {
                    let cont = t.translate(cont, &[])?;
                    Ok(Node::In { participant, sort, cont })
                })
            }
            Recursive::Out { participant, sort, cont } => {
                let (participant, sort) = (*participant, *sort);
                self.action(pending, |t| {
                    let cont = t.translate(cont, &[])?;
                    Ok(Node::Out { participant, sort, cont })
                })
            }
            Recursive::Branch { participant, branches } => {
                check_labels(*participant, branches)?;
                let participant = *participant;
                self.action(pending, |t| {
                    let branches = t.branches(branches)?;
                    Ok(Node::Branch { participant, branches })
                })
            }
            Recursive::Select { participant, branches } => {
                check_labels(*participant, branches)?;
                let participant = *participant;
                self.action(pending, |t| {
                    let branches = t.branches(branches)?;
                    Ok(Node::Select { participant, branches })
                })
            }
        }
    }

    /// Allocates the node for an action, binds every pending variable to it
    /// while its continuations are translated, then fills it in.
    fn action(
        &mut self,
        pending: &[Var],
        build: impl FnOnce(&mut Self) -> Result<Node, TranslateError>,
    ) -> Result<NodeId, TranslateError> {
        let id = self.ty.push(Node::End);
        let scope = self.bindings.len();
        self.bindings.extend(pending.iter().map(|&var| (var, id)));
        let node = build(self);
        self.bindings.truncate(scope);
        *self.ty.node_mut(id) = node?;
        Ok(id)
    }

    fn branches(
        &mut self,
        branches: &[(Label, Recursive)],
    ) -> Result<Vec<(Label, NodeId)>, TranslateError> {
        branches
            .iter()
            .map(|(label, cont)| Ok((*label, self.translate(cont, &[])?)))
            .collect()
    }
}

fn check_labels(
    participant: Participant,
    branches: &[(Label, Recursive)],
) -> Result<(), TranslateError> {
    if branches.windows(2).all(|pair| pair[0].0 < pair[1].0) {
        return Ok(());
    }
    Err(TranslateError::UnsortedLabels {
        participant,
        labels: branches.iter().map(|(label, _)| *label).collect(),
    })
}

impl Type {
    /// Builds the cyclic graph of a binder-based term.
    pub fn from_recursive(term: &Recursive) -> Result<Type, TranslateError> {
        let mut translator = Translator { ty: Type::new(), bindings: Vec::new() };
        let root = translator.translate(term, &[])?;
        translator.ty.set_root(root);
        Ok(translator.ty)
    }
}

impl TryFrom<&Recursive> for Type {
    type Error = TranslateError;

    fn try_from(term: &Recursive) -> Result<Self, Self::Error> {
        Type::from_recursive(term)
    }
}
