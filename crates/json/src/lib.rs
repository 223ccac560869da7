//! Generic access to JSON-like documents.
//!
//! Documents are accessed through the `AsNode` trait, which maps a concrete
//! representation onto the `Node` tagged union. Everything else in this crate
//! (pointers, locations, and leaf walking) is written against `AsNode`, and is
//! thus independent of how a document is actually stored.

mod location;
pub mod node;
pub mod ptr;
mod walk;

pub use location::{LocatedItem, LocatedProperty, Location, PointerStr};
pub use node::{is_populated_composite, AsNode, Field, Fields, Node};
pub use ptr::Pointer;
pub use walk::{flatten, walk_leaves, Leaf};
