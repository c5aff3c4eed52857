//! The parsed representation of FDO source text (`spec.md` §3).

use crate::error::Position;
use crate::table::AtomDefinition;

/// An ordered sequence of atoms, either the whole source or a nested-stream argument.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamNode {
    pub atoms: Vec<AtomNode>,
}

impl StreamNode {
    pub fn empty() -> Self {
        StreamNode { atoms: Vec::new() }
    }

    /// Structural equality that ignores source positions, for round-trip comparisons
    /// (`spec.md` §8 property 1).
    pub fn eq_ignoring_position(&self, other: &StreamNode) -> bool {
        self.atoms.len() == other.atoms.len()
            && self.atoms.iter().zip(&other.atoms).all(|(a, b)| a.eq_ignoring_position(b))
    }
}

/// A single atom occurrence: a name, an optional argument list, and the table entry it resolved
/// to (absent when the name is unrecognized; unrecognized atoms are tolerated by the parser and
/// only rejected later, at encode time, see `spec.md` §7).
#[derive(Clone, Debug, PartialEq)]
pub struct AtomNode {
    pub name: String,
    pub arguments: Option<Vec<ArgumentNode>>,
    pub definition: Option<AtomDefinition>,
    pub pos: Position,
}

impl AtomNode {
    pub fn eq_ignoring_position(&self, other: &AtomNode) -> bool {
        self.name == other.name
            && match (&self.arguments, &other.arguments) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignoring_position(y))
                }
                _ => false,
            }
    }
}

/// An atom argument. Closed tagged union (`spec.md` §3).
#[derive(Clone, Debug, PartialEq)]
pub enum ArgumentNode {
    String(String),
    Number(i64),
    /// Hex digits, without the trailing `x`/`X`.
    Hex(String),
    /// Raw `T-I` / `T-S-I` text.
    Gid(String),
    Identifier(String),
    /// A pipe-OR chain, e.g. `left | center`.
    Piped(Vec<ArgumentNode>),
    /// A comma-separated list that didn't collapse into an [`ArgumentNode::ObjectType`].
    List(Vec<ArgumentNode>),
    /// `Identifier, String` collapsed into one node, e.g. `<ind_group, "Title">`.
    ObjectType { type_name: String, title: String },
    /// An inlined stream used as an argument, with any trailing simple arguments attached after
    /// a following comma (`spec.md` §4.2 rule 2).
    NestedStream { stream: StreamNode, trailing: Vec<ArgumentNode> },
}

impl ArgumentNode {
    /// Structural equality that ignores source positions, recursing into nested streams so the
    /// guarantee holds for their atoms too, not just the top-level one (`spec.md` §8 property 1).
    pub fn eq_ignoring_position(&self, other: &ArgumentNode) -> bool {
        match (self, other) {
            (ArgumentNode::String(a), ArgumentNode::String(b)) => a == b,
            (ArgumentNode::Number(a), ArgumentNode::Number(b)) => a == b,
            (ArgumentNode::Hex(a), ArgumentNode::Hex(b)) => a == b,
            (ArgumentNode::Gid(a), ArgumentNode::Gid(b)) => a == b,
            (ArgumentNode::Identifier(a), ArgumentNode::Identifier(b)) => a == b,
            (ArgumentNode::Piped(a), ArgumentNode::Piped(b)) | (ArgumentNode::List(a), ArgumentNode::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignoring_position(y))
            }
            (
                ArgumentNode::ObjectType { type_name: tn_a, title: t_a },
                ArgumentNode::ObjectType { type_name: tn_b, title: t_b },
            ) => tn_a == tn_b && t_a == t_b,
            (
                ArgumentNode::NestedStream { stream: s_a, trailing: t_a },
                ArgumentNode::NestedStream { stream: s_b, trailing: t_b },
            ) => {
                s_a.eq_ignoring_position(s_b)
                    && t_a.len() == t_b.len()
                    && t_a.iter().zip(t_b).all(|(x, y)| x.eq_ignoring_position(y))
            }
            _ => false,
        }
    }
}
