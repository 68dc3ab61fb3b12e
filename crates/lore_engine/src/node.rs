use std::rc::Rc;

use lore_core::{FormatTemplate, MethodEntry, TimerKey, TriggerKey, Value};

use crate::holder::ScriptHolder;
use crate::tree::NodeId;

/// One executable unit of a compiled script tree.
///
/// The `Lazy*` variants hold only the unresolved name and unevaluated
/// operand ids; their first run resolves the binding, allocates the matching
/// specialized variant and replaces them in the tree. Specialized variants
/// persist for the lifetime of the compiled definition.
#[derive(Clone)]
pub(crate) enum Node {
    Const(Value),
    This,
    GetLocal {
        slot: usize,
    },
    SetLocal {
        slot: usize,
        value: NodeId,
    },
    GetArg {
        index: usize,
    },
    Script {
        lines: Vec<NodeId>,
    },
    If {
        cond: NodeId,
        then_body: Option<NodeId>,
        else_body: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: Option<NodeId>,
    },
    Foreach {
        slot: usize,
        source: NodeId,
        source_desc: Rc<str>,
        body: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    ReturnText {
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
    },
    Eval {
        operand: NodeId,
    },

    LazyCall {
        name: Rc<str>,
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
        /// When false, an unresolvable bare word collapses to its source
        /// text instead of raising an error.
        must_eval: bool,
        src_text: Rc<str>,
    },
    CallMethod {
        entry: Rc<MethodEntry>,
        args: Vec<NodeId>,
    },
    CallMethodText {
        entry: Rc<MethodEntry>,
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
    },
    CallMethodTrailing {
        entry: Rc<MethodEntry>,
        head: Vec<NodeId>,
        tail: Vec<NodeId>,
    },
    CallFunction {
        function: Rc<ScriptHolder>,
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
    },

    LazyAddTimer {
        key: TimerKey,
        seconds: NodeId,
        func_name: Rc<str>,
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
    },
    AddMethodTimer {
        key: TimerKey,
        entry: Rc<MethodEntry>,
        seconds: NodeId,
        args: Vec<NodeId>,
    },
    AddMethodTimerText {
        key: TimerKey,
        entry: Rc<MethodEntry>,
        seconds: NodeId,
        args: Vec<NodeId>,
        template: Rc<FormatTemplate>,
    },
    AddMethodTimerTrailing {
        key: TimerKey,
        entry: Rc<MethodEntry>,
        seconds: NodeId,
        head: Vec<NodeId>,
        tail: Vec<NodeId>,
    },
    AddFunctionTimer {
        key: TimerKey,
        function: Rc<ScriptHolder>,
        template: Rc<FormatTemplate>,
        seconds: NodeId,
        args: Vec<NodeId>,
    },
    AddTriggerTimer {
        key: TimerKey,
        trigger: TriggerKey,
        template: Rc<FormatTemplate>,
        seconds: NodeId,
        args: Vec<NodeId>,
    },

    LazyRandom {
        values: Vec<NodeId>,
        odds: Vec<NodeId>,
        simple: bool,
    },
    RandomRange {
        lo: i64,
        hi: i64,
    },
    RandomRangeVar {
        lo: NodeId,
        hi: NodeId,
    },
    RandomConst {
        values: Vec<NodeId>,
        cumulative: Rc<[i64]>,
        total: i64,
    },
    RandomVar {
        values: Vec<NodeId>,
        odds: Vec<NodeId>,
    },

    /// Tombstone left where a node was replaced; forwards any id still in
    /// flight to the replacement.
    Moved(NodeId),
}

fn swap_in(list: &mut [NodeId], old: NodeId, new: NodeId) -> bool {
    for id in list.iter_mut() {
        if *id == old {
            *id = new;
            return true;
        }
    }
    false
}

fn swap_id(id: &mut NodeId, old: NodeId, new: NodeId) -> bool {
    if *id == old {
        *id = new;
        return true;
    }
    false
}

fn swap_opt(id: &mut Option<NodeId>, old: NodeId, new: NodeId) -> bool {
    match id {
        Some(inner) => swap_id(inner, old, new),
        None => false,
    }
}

impl Node {
    /// Swaps `old` for `new` among this node's operand slots. Returns false
    /// when `old` is not an operand of this node.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        match self {
            Node::Const(_)
            | Node::This
            | Node::GetLocal { .. }
            | Node::GetArg { .. }
            | Node::RandomRange { .. }
            | Node::Moved(_) => false,
            Node::SetLocal { value, .. } => swap_id(value, old, new),
            Node::Script { lines } => swap_in(lines, old, new),
            Node::If {
                cond,
                then_body,
                else_body,
            } => {
                swap_id(cond, old, new)
                    || swap_opt(then_body, old, new)
                    || swap_opt(else_body, old, new)
            }
            Node::While { cond, body } => swap_id(cond, old, new) || swap_opt(body, old, new),
            Node::Foreach { source, body, .. } => {
                swap_id(source, old, new) || swap_opt(body, old, new)
            }
            Node::Return { value } => swap_opt(value, old, new),
            Node::ReturnText { args, .. } => swap_in(args, old, new),
            Node::Eval { operand } => swap_id(operand, old, new),
            Node::LazyCall { args, .. } => swap_in(args, old, new),
            Node::CallMethod { args, .. } => swap_in(args, old, new),
            Node::CallMethodText { args, .. } => swap_in(args, old, new),
            Node::CallMethodTrailing { head, tail, .. } => {
                swap_in(head, old, new) || swap_in(tail, old, new)
            }
            Node::CallFunction { args, .. } => swap_in(args, old, new),
            Node::LazyAddTimer { seconds, args, .. } => {
                swap_in(args, old, new) || swap_id(seconds, old, new)
            }
            Node::AddMethodTimer { seconds, args, .. } => {
                swap_in(args, old, new) || swap_id(seconds, old, new)
            }
            Node::AddMethodTimerText { seconds, args, .. } => {
                swap_in(args, old, new) || swap_id(seconds, old, new)
            }
            Node::AddMethodTimerTrailing {
                seconds,
                head,
                tail,
                ..
            } => {
                swap_in(head, old, new)
                    || swap_in(tail, old, new)
                    || swap_id(seconds, old, new)
            }
            Node::AddFunctionTimer { seconds, args, .. } => {
                swap_in(args, old, new) || swap_id(seconds, old, new)
            }
            Node::AddTriggerTimer { seconds, args, .. } => {
                swap_in(args, old, new) || swap_id(seconds, old, new)
            }
            Node::LazyRandom { values, odds, .. } => {
                swap_in(values, old, new) || swap_in(odds, old, new)
            }
            Node::RandomRangeVar { lo, hi } => {
                swap_id(lo, old, new) || swap_id(hi, old, new)
            }
            Node::RandomConst { values, .. } => swap_in(values, old, new),
            Node::RandomVar { values, odds } => {
                swap_in(values, old, new) || swap_in(odds, old, new)
            }
        }
    }
}
