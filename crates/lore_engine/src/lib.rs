//! The LoreScript interpreter core.
//!
//! Scripts are compiled once from an externally-produced parse tree into an
//! arena of executable nodes and then interpreted directly on that tree.
//! Call sites compile to *lazy* nodes that do not yet know which member they
//! bind to; on first execution a lazy node resolves the member against the
//! acting object's capability table, builds the one specialized node the
//! resolved binding shape implies, splices it into the tree in its own place
//! and is never consulted again. Resolution cost is paid once per tree
//! position, not once per invocation.
//!
//! A compiled tree may be re-run arbitrarily many times, but invocations of
//! the same tree must be serialized by the caller: the in-place rewrite is
//! not synchronized.

mod compile;
mod context;
mod engine;
mod exec;
mod holder;
mod node;
mod resolver;
mod tree;

pub use context::{ScriptArgs, ScriptVars};
pub use engine::{Engine, RngAlgorithm};
pub use holder::ScriptHolder;

// The error surface, re-exported so embedders need only this crate.
pub use lore_syntax::{ScriptError, ScriptErrorKind, SrcPos};
