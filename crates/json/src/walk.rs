use crate::{AsNode, Field, Fields, Location, Node, Pointer};
use std::ops::ControlFlow;

/// Leaf is a scalar value reached while walking a document.
/// Arrays and objects are never leaves: they're walked into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'n> {
    Bool(bool),
    Float(f64),
    NegInt(i64),
    Null,
    PosInt(u64),
    String(&'n str),
}

impl<'n> Leaf<'n> {
    /// Returns the string value of this leaf, if it's a string.
    pub fn as_str(&self) -> Option<&'n str> {
        match self {
            Leaf::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Walk every scalar leaf of `doc` in depth-first order, calling `visit`
/// with the leaf's location and value. Array items are visited in index
/// order and object fields in the enumeration order of the representation.
///
/// The walk stops as soon as `visit` returns `ControlFlow::Break`, and the
/// break value is returned. If every leaf is visited then None is returned.
pub fn walk_leaves<'n, N, B, F>(doc: &'n N, mut visit: F) -> Option<B>
where
    N: AsNode,
    F: FnMut(&Location, Leaf<'n>) -> ControlFlow<B>,
{
    fn inner<'n, N, B, F>(location: &Location, node: &'n N, visit: &mut F) -> ControlFlow<B>
    where
        N: AsNode,
        F: FnMut(&Location, Leaf<'n>) -> ControlFlow<B>,
    {
        match node.as_node() {
            Node::Array(arr) => {
                for (index, item) in arr.iter().enumerate() {
                    inner(&location.push_item(index), item, visit)?;
                }
                ControlFlow::Continue(())
            }
            Node::Object(fields) => {
                for field in fields.iter() {
                    inner(&location.push_prop(field.property()), field.value(), visit)?;
                }
                ControlFlow::Continue(())
            }
            Node::Bool(b) => visit(location, Leaf::Bool(b)),
            Node::Float(f) => visit(location, Leaf::Float(f)),
            Node::NegInt(n) => visit(location, Leaf::NegInt(n)),
            Node::Null => visit(location, Leaf::Null),
            Node::PosInt(n) => visit(location, Leaf::PosInt(n)),
            Node::String(s) => visit(location, Leaf::String(s)),
        }
    }

    match inner(&Location::Root, doc, &mut visit) {
        ControlFlow::Break(b) => Some(b),
        ControlFlow::Continue(()) => None,
    }
}

/// Flatten `doc` into the ordered sequence of its leaves and their pointers.
pub fn flatten<'n, N: AsNode>(doc: &'n N) -> Vec<(Pointer, Leaf<'n>)> {
    let mut out = Vec::new();

    let _: Option<()> = walk_leaves(doc, |location, leaf| {
        out.push((Pointer::from_location(location), leaf));
        ControlFlow::Continue(())
    });
    out
}
