#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use lore_core::{
    AttachmentHost, MethodEntry, ScriptObject, TimerDescriptor, TimerKey, TypeVtable, Value,
};
use lore_tree::{ParseKind, ParseNode};

// ---------------------------------------------------------------------------
// Parse-tree builders. The grammar front end is external; tests hand the
// compiler the same shapes it would produce.
// ---------------------------------------------------------------------------

pub fn ident(name: &str) -> ParseNode {
    ParseNode::token(ParseKind::Ident, name, 1, 0)
}

pub fn int(value: i64) -> ParseNode {
    ParseNode::token(ParseKind::IntLit, value.to_string(), 1, 0)
}

pub fn float(value: f64) -> ParseNode {
    ParseNode::token(ParseKind::FloatLit, value.to_string(), 1, 0)
}

pub fn strlit(text: &str) -> ParseNode {
    ParseNode::token(ParseKind::StrLit, text, 1, 0)
}

pub fn trigger(name: &str) -> ParseNode {
    ParseNode::token(ParseKind::TriggerName, name, 1, 0)
}

pub fn arg_ref(index: usize) -> ParseNode {
    ParseNode::token(ParseKind::ArgRef, index.to_string(), 1, 0)
}

pub fn sep(text: &str) -> ParseNode {
    ParseNode::token(ParseKind::Separator, text, 1, 0)
}

/// Arguments separated by `", "`, the way the parser hands them over.
pub fn arg_list(items: Vec<ParseNode>) -> ParseNode {
    let mut children = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            children.push(sep(", "));
        }
        children.push(item);
    }
    ParseNode::production(ParseKind::ArgList, children, 1, 0)
}

pub fn call(name: &str, args: Vec<ParseNode>) -> ParseNode {
    let mut children = vec![ident(name)];
    if !args.is_empty() {
        children.push(arg_list(args));
    }
    ParseNode::production(ParseKind::Call, children, 1, 0)
}

pub fn call_noargs(name: &str) -> ParseNode {
    ParseNode::production(ParseKind::Call, vec![ident(name)], 1, 0)
}

pub fn script(lines: Vec<ParseNode>) -> ParseNode {
    ParseNode::production(ParseKind::Script, lines, 1, 0)
}

pub fn eval(operand: ParseNode) -> ParseNode {
    ParseNode::production(ParseKind::Eval, vec![operand], 1, 0)
}

pub fn assign(name: &str, value: ParseNode) -> ParseNode {
    ParseNode::production(ParseKind::LocalAssign, vec![ident(name), value], 1, 0)
}

pub fn ret(value: Option<ParseNode>) -> ParseNode {
    ParseNode::production(ParseKind::Return, value.into_iter().collect(), 1, 0)
}

pub fn foreach(var: &str, source: ParseNode, body: Vec<ParseNode>) -> ParseNode {
    ParseNode::production(
        ParseKind::Foreach,
        vec![ident(var), source, script(body)],
        1,
        0,
    )
}

pub fn add_timer(
    key: &str,
    seconds: ParseNode,
    target: ParseNode,
    args: Option<Vec<ParseNode>>,
) -> ParseNode {
    let mut children = vec![strlit(key), seconds, target];
    if let Some(args) = args {
        children.push(arg_list(args));
    }
    ParseNode::production(ParseKind::AddTimer, children, 1, 0)
}

pub fn random_range(lo: ParseNode, hi: ParseNode) -> ParseNode {
    ParseNode::production(ParseKind::Random, vec![lo, hi], 1, 0)
}

pub fn random_weighted(pairs: Vec<(ParseNode, ParseNode)>) -> ParseNode {
    let children = pairs
        .into_iter()
        .map(|(value, odds)| {
            ParseNode::production(ParseKind::RandomPair, vec![value, odds], 1, 0)
        })
        .collect();
    ParseNode::production(ParseKind::Random, children, 1, 0)
}

// ---------------------------------------------------------------------------
// Observation log shared between native methods and assertions.
// ---------------------------------------------------------------------------

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn log_entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ---------------------------------------------------------------------------
// Test game objects.
// ---------------------------------------------------------------------------

/// A plugin-bearing test object: carries a capability table and collects
/// every timer registered against it.
pub struct Npc {
    vtable: Rc<TypeVtable>,
    pub timers: Vec<(TimerKey, Rc<TimerDescriptor>)>,
    pub hp: i64,
}

impl Npc {
    pub fn new(vtable: Rc<TypeVtable>) -> Self {
        Self {
            vtable,
            timers: Vec::new(),
            hp: 100,
        }
    }
}

impl ScriptObject for Npc {
    fn vtable(&self) -> Rc<TypeVtable> {
        self.vtable.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_attachment_host(&mut self) -> Option<&mut dyn AttachmentHost> {
        Some(self)
    }
}

impl AttachmentHost for Npc {
    fn add_timer(&mut self, key: TimerKey, timer: Rc<TimerDescriptor>) {
        self.timers.push((key, timer));
    }
}

/// An object with no attachment surface, for capability-violation cases.
pub struct Stone;

impl ScriptObject for Stone {
    fn vtable(&self) -> Rc<TypeVtable> {
        TypeVtable::builder("stone").build()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn npc_value(vtable: Rc<TypeVtable>) -> (Value, Rc<RefCell<Npc>>) {
    let npc = Rc::new(RefCell::new(Npc::new(vtable)));
    let obj: Rc<RefCell<dyn ScriptObject>> = npc.clone();
    (Value::Object(obj), npc)
}

pub fn stone_value() -> Value {
    let obj: Rc<RefCell<dyn ScriptObject>> = Rc::new(RefCell::new(Stone));
    Value::Object(obj)
}

/// A fixed-arity entry that logs its invocation and returns null.
pub fn logging_entry(name: &'static str, params: Vec<lore_core::ParamType>, log: Log) -> MethodEntry {
    MethodEntry::fixed(name, params, move |_, args| {
        let rendered: Vec<String> = args.iter().map(|a| a.display_string()).collect();
        log.borrow_mut().push(format!("{}({})", name, rendered.join(",")));
        Ok(Value::Null)
    })
}
