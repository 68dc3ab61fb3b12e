use std::rc::Rc;

use indexmap::IndexMap;
use lore_core::{FormatTemplate, TemplateBuilder, TimerKey, TriggerKey, Value};
use lore_syntax::{ScriptError, ScriptErrorKind, SrcPos};
use lore_tree::{ParseKind, ParseNode};

use crate::node::Node;
use crate::tree::{NodeId, Tree};

/// Turns parse-tree nodes into executable nodes, one at a time,
/// recursively. Identifier and call productions compile to lazy nodes; the
/// local-variable slot table fills in as assignments and loop variables are
/// encountered.
pub(crate) struct Compiler<'a> {
    tree: &'a Tree,
    locals: &'a mut IndexMap<String, usize>,
    filename: Rc<str>,
    start_line: u32,
    script_name: String,
}

impl<'a> Compiler<'a> {
    pub fn new(
        tree: &'a Tree,
        locals: &'a mut IndexMap<String, usize>,
        filename: Rc<str>,
        start_line: u32,
        script_name: &str,
    ) -> Self {
        Self {
            tree,
            locals,
            filename,
            start_line,
            script_name: script_name.to_string(),
        }
    }

    pub fn compile_root(&mut self, code: &ParseNode) -> Result<NodeId, ScriptError> {
        self.compile_node(NodeId::NONE, code)
    }

    fn pos(&self, code: &ParseNode) -> SrcPos {
        SrcPos::new(
            self.filename.clone(),
            self.start_line + code.line(),
            code.column(),
        )
    }

    fn err(&self, code: &ParseNode, kind: ScriptErrorKind) -> ScriptError {
        ScriptError::new(kind, self.pos(code), self.script_name.clone())
    }

    fn uncompilable(&self, code: &ParseNode) -> ScriptError {
        self.err(code, ScriptErrorKind::UncompilableNode(code.source_text()))
    }

    fn local_slot(&mut self, name: &str) -> usize {
        let key = name.to_ascii_lowercase();
        if let Some(&index) = self.locals.get(&key) {
            return index;
        }
        let index = self.locals.len();
        self.locals.insert(key, index);
        index
    }

    fn child<'c>(&self, code: &'c ParseNode, index: usize) -> Result<&'c ParseNode, ScriptError> {
        code.child(index).ok_or_else(|| self.uncompilable(code))
    }

    fn compile_node(&mut self, parent: NodeId, code: &ParseNode) -> Result<NodeId, ScriptError> {
        let pos = self.pos(code);
        match code.kind() {
            ParseKind::IntLit => {
                let value = parse_int(code.image())
                    .ok_or_else(|| self.err(code, ScriptErrorKind::Raw(
                        format!("Failed to parse integer '{}'", code.image()),
                    )))?;
                Ok(self.tree.alloc(Node::Const(Value::Int(value)), parent, pos))
            }
            ParseKind::FloatLit => {
                let value: f64 = code.image().parse().map_err(|_| {
                    self.err(code, ScriptErrorKind::Raw(
                        format!("Failed to parse decimal number '{}'", code.image()),
                    ))
                })?;
                Ok(self.tree.alloc(Node::Const(Value::Float(value)), parent, pos))
            }
            ParseKind::StrLit => Ok(self.tree.alloc(
                Node::Const(Value::str(code.image())),
                parent,
                pos,
            )),
            ParseKind::ArgRef => {
                let index: usize = code.image().parse().map_err(|_| {
                    self.err(code, ScriptErrorKind::Raw(
                        format!("Bad argument reference '{}'", code.image()),
                    ))
                })?;
                Ok(self.tree.alloc(Node::GetArg { index }, parent, pos))
            }
            ParseKind::Ident => self.compile_ident(parent, code, pos),
            ParseKind::Script => {
                let id = self.placeholder(parent, pos);
                let mut lines = Vec::with_capacity(code.child_count());
                for line in code.children() {
                    lines.push(self.compile_node(id, line)?);
                }
                self.tree.set_node(id, Node::Script { lines });
                Ok(id)
            }
            ParseKind::Call => self.compile_call(parent, code, pos),
            ParseKind::Eval => self.compile_eval(parent, code, pos),
            ParseKind::AddTimer => self.compile_add_timer(parent, code, pos),
            ParseKind::Foreach => self.compile_foreach(parent, code, pos),
            ParseKind::IfBlock => {
                let id = self.placeholder(parent, pos);
                let cond = self.compile_node(id, self.child(code, 0)?)?;
                let then_body = self.compile_body(id, code.child(1))?;
                let else_body = self.compile_body(id, code.child(2))?;
                self.tree.set_node(id, Node::If { cond, then_body, else_body });
                Ok(id)
            }
            ParseKind::WhileBlock => {
                let id = self.placeholder(parent, pos);
                let cond = self.compile_node(id, self.child(code, 0)?)?;
                let body = self.compile_body(id, code.child(1))?;
                self.tree.set_node(id, Node::While { cond, body });
                Ok(id)
            }
            ParseKind::Return => self.compile_return(parent, code, pos),
            ParseKind::LocalAssign => {
                let name = self.child(code, 0)?;
                if name.kind() != ParseKind::Ident {
                    return Err(self.uncompilable(code));
                }
                let slot = self.local_slot(name.image());
                let id = self.placeholder(parent, pos);
                let value = self.compile_node(id, self.child(code, 1)?)?;
                self.tree.set_node(id, Node::SetLocal { slot, value });
                Ok(id)
            }
            ParseKind::Random => self.compile_random(parent, code, pos),
            ParseKind::TriggerName
            | ParseKind::Separator
            | ParseKind::ArgList
            | ParseKind::RandomPair => Err(self.uncompilable(code)),
        }
    }

    /// Allocates the owner slot before its children so their parent ids are
    /// final; the real variant is stored once the children exist.
    fn placeholder(&mut self, parent: NodeId, pos: SrcPos) -> NodeId {
        self.tree.alloc(Node::Const(Value::Null), parent, pos)
    }

    fn compile_ident(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let image = code.image();
        let node = if image.eq_ignore_ascii_case("this") {
            Node::This
        } else if image.eq_ignore_ascii_case("true") {
            Node::Const(Value::Bool(true))
        } else if image.eq_ignore_ascii_case("false") {
            Node::Const(Value::Bool(false))
        } else if image.eq_ignore_ascii_case("null") {
            Node::Const(Value::Null)
        } else {
            // A bare word: resolvable as local, member, function or
            // intrinsic at first run, and allowed to collapse to its own
            // text when nothing matches.
            Node::LazyCall {
                name: Rc::from(image),
                args: Vec::new(),
                template: Rc::new(FormatTemplate::empty()),
                must_eval: false,
                src_text: Rc::from(image),
            }
        };
        Ok(self.tree.alloc(node, parent, pos))
    }

    fn compile_call(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let name_node = self.child(code, 0)?;
        if name_node.kind() != ParseKind::Ident {
            return Err(self.uncompilable(code));
        }
        let id = self.placeholder(parent, pos);
        let (args, template) = self.compile_call_args(id, code.child(1))?;
        self.tree.set_node(
            id,
            Node::LazyCall {
                name: Rc::from(name_node.image()),
                args,
                template: Rc::new(template),
                must_eval: true,
                src_text: Rc::from(code.source_text().as_str()),
            },
        );
        Ok(id)
    }

    /// Compiles a call site's argument production: either nothing, an
    /// `ArgList` whose separator images become the format template's literal
    /// pieces, or a single bare expression.
    fn compile_call_args(
        &mut self,
        owner: NodeId,
        args_node: Option<&ParseNode>,
    ) -> Result<(Vec<NodeId>, FormatTemplate), ScriptError> {
        match args_node {
            None => Ok((Vec::new(), FormatTemplate::empty())),
            Some(list) if list.kind() == ParseKind::ArgList => {
                let mut args = Vec::new();
                let mut template = TemplateBuilder::new();
                for child in list.children() {
                    if child.kind() == ParseKind::Separator {
                        template.push_lit(child.image());
                    } else {
                        template.push_arg(args.len());
                        args.push(self.compile_node(owner, child)?);
                    }
                }
                Ok((args, template.build()))
            }
            Some(expr) => {
                let arg = self.compile_node(owner, expr)?;
                Ok((vec![arg], FormatTemplate::solo()))
            }
        }
    }

    fn compile_eval(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let id = self.placeholder(parent, pos);
        let operand = self.compile_node(id, self.child(code, 0)?)?;
        if self.tree.is_const(operand) {
            // Already a constant: the wrapper collapses right here at
            // compile time instead of waiting for a first run.
            self.tree.set_node(id, Node::Moved(operand));
            self.tree.set_parent(operand, parent);
            return Ok(operand);
        }
        self.tree.set_node(id, Node::Eval { operand });
        Ok(id)
    }

    fn compile_add_timer(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let key_node = self.child(code, 0)?;
        if key_node.kind() != ParseKind::StrLit {
            return Err(self.uncompilable(code));
        }
        let key = TimerKey::acquire(key_node.image());
        let id = self.placeholder(parent, pos);
        let seconds = self.compile_node(id, self.child(code, 1)?)?;
        let target = self.child(code, 2)?;
        let (args, template) = self.compile_call_args(id, code.child(3))?;
        let template = Rc::new(template);
        let node = match target.kind() {
            // A named trigger needs no member resolution; it compiles to
            // its final node directly.
            ParseKind::TriggerName => Node::AddTriggerTimer {
                key,
                trigger: TriggerKey::acquire(target.image()),
                template,
                seconds,
                args,
            },
            ParseKind::Ident => Node::LazyAddTimer {
                key,
                seconds,
                func_name: Rc::from(target.image()),
                args,
                template,
            },
            _ => return Err(self.uncompilable(code)),
        };
        self.tree.set_node(id, node);
        Ok(id)
    }

    fn compile_foreach(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let var = self.child(code, 0)?;
        if var.kind() != ParseKind::Ident {
            return Err(self.uncompilable(code));
        }
        let slot = self.local_slot(var.image());
        let id = self.placeholder(parent, pos);
        let source_node = self.child(code, 1)?;
        let source = self.compile_node(id, source_node)?;
        let source_desc: Rc<str> = Rc::from(source_node.source_text().as_str());
        let body = self.compile_body(id, code.child(2))?;
        self.tree.set_node(
            id,
            Node::Foreach {
                slot,
                source,
                source_desc,
                body,
            },
        );
        Ok(id)
    }

    /// An absent or empty body compiles to nothing at all.
    fn compile_body(
        &mut self,
        owner: NodeId,
        body: Option<&ParseNode>,
    ) -> Result<Option<NodeId>, ScriptError> {
        match body {
            Some(node) if node.kind() == ParseKind::Script && node.child_count() == 0 => Ok(None),
            Some(node) => Ok(Some(self.compile_node(owner, node)?)),
            None => Ok(None),
        }
    }

    fn compile_return(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        match code.child(0) {
            None => Ok(self.tree.alloc(Node::Return { value: None }, parent, pos)),
            Some(list) if list.kind() == ParseKind::ArgList => {
                let id = self.placeholder(parent, pos);
                let (mut args, template) = self.compile_call_args(id, Some(list))?;
                let node = if args.len() > 1 {
                    Node::ReturnText {
                        args,
                        template: Rc::new(template),
                    }
                } else {
                    Node::Return { value: args.pop() }
                };
                self.tree.set_node(id, node);
                Ok(id)
            }
            Some(expr) => {
                let id = self.placeholder(parent, pos);
                let value = self.compile_node(id, expr)?;
                self.tree.set_node(id, Node::Return { value: Some(value) });
                Ok(id)
            }
        }
    }

    fn compile_random(
        &mut self,
        parent: NodeId,
        code: &ParseNode,
        pos: SrcPos,
    ) -> Result<NodeId, ScriptError> {
        let id = self.placeholder(parent, pos);
        let all_pairs =
            code.child_count() > 0 && code.children().all(|c| c.kind() == ParseKind::RandomPair);
        if all_pairs {
            let mut values = Vec::with_capacity(code.child_count());
            let mut odds = Vec::with_capacity(code.child_count());
            for pair in code.children() {
                values.push(self.compile_node(id, self.child(pair, 0)?)?);
                odds.push(self.compile_node(id, self.child(pair, 1)?)?);
            }
            self.tree.set_node(
                id,
                Node::LazyRandom {
                    values,
                    odds,
                    simple: false,
                },
            );
            return Ok(id);
        }
        if code.child_count() == 2 {
            let lo = self.compile_node(id, self.child(code, 0)?)?;
            let hi = self.compile_node(id, self.child(code, 1)?)?;
            self.tree.set_node(
                id,
                Node::LazyRandom {
                    values: vec![lo, hi],
                    odds: Vec::new(),
                    simple: true,
                },
            );
            return Ok(id);
        }
        Err(self.uncompilable(code))
    }
}

fn parse_int(image: &str) -> Option<i64> {
    let trimmed = image.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    trimmed.parse().ok()
}
