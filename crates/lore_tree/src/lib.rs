//! The parse-tree abstraction consumed by the LoreScript compiler.
//!
//! The grammar front end is an external collaborator; it hands the engine a
//! tree of typed nodes. A node is either a *token* (a leaf carrying its
//! source image) or a *production* (an inner node with children addressed by
//! index). Both carry 1-based line/column positions relative to the compiled
//! section.

mod node;

pub use node::{ParseKind, ParseNode};
