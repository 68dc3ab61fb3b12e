use std::fmt;
use std::rc::Rc;

/// A position in script source: file name plus 1-based line and column.
///
/// Lines are absolute within the file; a script section compiled from the
/// middle of a file carries the section's start line folded in already.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrcPos {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl SrcPos {
    pub fn new(file: Rc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    pub fn unknown() -> Self {
        Self {
            file: Rc::from("<unknown>"),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for SrcPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
