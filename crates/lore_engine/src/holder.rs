use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use lore_core::{ScriptFunction, Value};
use lore_syntax::{ScriptError, ScriptErrorKind, SrcPos};
use lore_tree::ParseNode;

use crate::compile::Compiler;
use crate::context::{ScriptArgs, ScriptVars};
use crate::engine::Engine;
use crate::tree::Tree;

/// One compiled script definition: the node tree, the fixed local-variable
/// slot table and the source metadata used to attribute errors.
///
/// A holder is compiled once and re-run arbitrarily many times; the lazy
/// nodes inside its tree specialize themselves across those runs. Runs of
/// the same holder must be serialized by the caller.
pub struct ScriptHolder {
    name: Box<str>,
    filename: Rc<str>,
    start_line: u32,
    /// Name of the containing trigger group, if any; folded into the
    /// decorated name shown in errors.
    group: Option<Box<str>>,
    locals: IndexMap<String, usize>,
    pub(crate) tree: Tree,
    unloaded: Cell<bool>,
}

impl ScriptHolder {
    /// Compiles one parse-tree node (recursively) into an executable tree.
    /// `start_line` is the line the compiled section starts at within
    /// `filename`; node positions fold it in.
    pub fn compile(
        name: &str,
        filename: &str,
        start_line: u32,
        code: &ParseNode,
    ) -> Result<ScriptHolder, ScriptError> {
        let tree = Tree::new();
        let filename: Rc<str> = Rc::from(filename);
        let mut locals = IndexMap::new();
        let root = {
            let mut compiler = Compiler::new(&tree, &mut locals, filename.clone(), start_line, name);
            compiler.compile_root(code)?
        };
        tree.set_root(root);
        Ok(ScriptHolder {
            name: name.into(),
            filename,
            start_line,
            group: None,
            locals,
            tree,
            unloaded: Cell::new(false),
        })
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Display name used when attributing errors: `group: @name` for a
    /// trigger inside a group, the bare name otherwise.
    pub fn decorated_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{}: @{}", group, self.name),
            None => self.name.to_string(),
        }
    }

    pub fn origin_pos(&self) -> SrcPos {
        SrcPos::new(self.filename.clone(), self.start_line, 0)
    }

    pub fn locals_count(&self) -> usize {
        self.locals.len()
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded.get()
    }

    /// Marks the holder unloaded; running it afterwards is an error until it
    /// is replaced by a fresh compilation under the same name.
    pub fn unload(&self) {
        self.unloaded.set(true);
    }

    /// One-line structural rendering of the compiled tree.
    pub fn describe(&self) -> String {
        self.tree.describe(self.tree.root())
    }

    /// Runs the compiled tree as a function/trigger body: builds a fresh
    /// context and yields the script's value only when it actually
    /// `return`ed; a body that merely fell off the end yields null.
    pub fn run(
        &self,
        engine: &Engine,
        self_obj: Value,
        args: ScriptArgs,
    ) -> Result<Value, ScriptError> {
        let mut vars = ScriptVars::new(engine, self_obj, self.locals_count(), args);
        let ret = self.run_with(&mut vars)?;
        Ok(if vars.returned { ret } else { Value::Null })
    }

    /// Runs the compiled tree against a caller-supplied context and returns
    /// the root's value as-is. This is the raw entry point; snippets use it
    /// to observe the last evaluated value.
    pub fn run_with(&self, vars: &mut ScriptVars<'_>) -> Result<Value, ScriptError> {
        if self.unloaded.get() {
            return Err(self.err(
                self.origin_pos(),
                ScriptErrorKind::HolderUnloaded(self.name.to_string()),
            ));
        }
        if vars.locals.len() < self.locals_count() {
            vars.locals.resize(self.locals_count(), Value::Null);
        }
        self.run_node(self.tree.root(), vars)
    }

    pub(crate) fn local_index(&self, name: &str) -> Option<usize> {
        self.locals.get(&name.to_ascii_lowercase()).copied()
    }

    pub(crate) fn err(&self, pos: SrcPos, kind: ScriptErrorKind) -> ScriptError {
        ScriptError::new(kind, pos, self.decorated_name())
    }
}

impl ScriptFunction for ScriptHolder {
    fn name(&self) -> &str {
        &self.name
    }
}
