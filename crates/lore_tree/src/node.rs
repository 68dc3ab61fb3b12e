use std::fmt;

/// Node types produced by the grammar front end.
///
/// Production shapes, children in order:
///
/// - `Script`: zero or more statement nodes.
/// - `Call`: `Ident` token, then optionally an `ArgList` or a single
///   expression node.
/// - `ArgList`: expression nodes alternating with `Separator` tokens; the
///   separator images are the literal text between arguments and are folded
///   into the format template of string-shape calls.
/// - `Eval`: one operand expression.
/// - `AddTimer`: `StrLit` key token, duration expression, `Ident` or
///   `TriggerName` token, then optionally an `ArgList`.
/// - `Foreach`: `Ident` loop-variable token, source expression, `Script`.
/// - `IfBlock`: condition expression, `Script`, optional else `Script`.
/// - `WhileBlock`: condition expression, `Script`.
/// - `Return`: nothing, one expression, or an `ArgList`.
/// - `LocalAssign`: `Ident` token, value expression.
/// - `Random`: either two bound expressions (a numeric range), or one or
///   more `RandomPair` productions.
/// - `RandomPair`: value expression, odds expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseKind {
    // Tokens
    Ident,
    IntLit,
    FloatLit,
    StrLit,
    TriggerName,
    ArgRef,
    Separator,

    // Productions
    Script,
    Call,
    ArgList,
    Eval,
    AddTimer,
    Foreach,
    IfBlock,
    WhileBlock,
    Return,
    LocalAssign,
    Random,
    RandomPair,
}

impl ParseKind {
    pub fn is_token(self) -> bool {
        matches!(
            self,
            ParseKind::Ident
                | ParseKind::IntLit
                | ParseKind::FloatLit
                | ParseKind::StrLit
                | ParseKind::TriggerName
                | ParseKind::ArgRef
                | ParseKind::Separator
        )
    }
}

/// One node of the externally-produced parse tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseNode {
    kind: ParseKind,
    image: Option<Box<str>>,
    children: Vec<ParseNode>,
    line: u32,
    column: u32,
}

impl ParseNode {
    pub fn token(kind: ParseKind, image: impl Into<Box<str>>, line: u32, column: u32) -> Self {
        debug_assert!(kind.is_token());
        Self {
            kind,
            image: Some(image.into()),
            children: Vec::new(),
            line,
            column,
        }
    }

    pub fn production(kind: ParseKind, children: Vec<ParseNode>, line: u32, column: u32) -> Self {
        debug_assert!(!kind.is_token());
        Self {
            kind,
            image: None,
            children,
            line,
            column,
        }
    }

    pub fn kind(&self) -> ParseKind {
        self.kind
    }

    pub fn is_token(&self) -> bool {
        self.kind.is_token()
    }

    /// The source image of a token; empty for productions.
    pub fn image(&self) -> &str {
        self.image.as_deref().unwrap_or("")
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&ParseNode> {
        self.children.get(index)
    }

    pub fn children(&self) -> impl Iterator<Item = &ParseNode> {
        self.children.iter()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Reconstructs the source text covered by this node, token images in
    /// order. Used for bare-word fallback and error reporting.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        self.build_text(&mut out);
        out
    }

    fn build_text(&self, out: &mut String) {
        if let Some(image) = &self.image {
            out.push_str(image);
            return;
        }
        for child in &self.children {
            child.build_text(out);
        }
    }

    /// The image of the leftmost token under this node.
    pub fn first_token_text(&self) -> &str {
        match &self.image {
            Some(image) => image,
            None => self
                .children
                .first()
                .map(|c| c.first_token_text())
                .unwrap_or(""),
        }
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.image {
            Some(image) => write!(f, "{:?}({})", self.kind, image),
            None => write!(f, "{:?}[{}]", self.kind, self.children.len()),
        }
    }
}
