use std::fmt;

use crate::{ErrorFormatter, ScriptErrorKind, SrcPos};

/// A script-author-facing error, wrapped with the source position and the
/// display name of the enclosing script before it crosses the interpreter
/// boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub pos: SrcPos,
    pub script: String,
}

impl ScriptError {
    pub fn new(kind: ScriptErrorKind, pos: SrcPos, script: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            script: script.into(),
        }
    }

    pub fn message(&self) -> String {
        ErrorFormatter::format(&self.kind)
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.pos, self.script, self.message())
    }
}

impl std::error::Error for ScriptError {}
