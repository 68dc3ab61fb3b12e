use std::cell::{Cell, RefCell};

use lore_syntax::SrcPos;

use crate::node::Node;

/// Stable handle to one node in a compiled tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// The parent of the root node.
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    fn idx(self) -> usize {
        self.0 as usize
    }
}

struct Slot {
    node: Node,
    parent: NodeId,
    pos: SrcPos,
}

/// Arena of executable nodes. Nodes reference each other by id; replacing a
/// node overwrites the owning child slot rather than rewriting references,
/// which keeps the self-rewrite protocol a single slot store.
///
/// Interior mutability allows a node to splice its own replacement into the
/// tree mid-run. Borrows are never held across child execution.
pub(crate) struct Tree {
    slots: RefCell<Vec<Slot>>,
    root: Cell<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            root: Cell::new(NodeId::NONE),
        }
    }

    pub fn alloc(&self, node: Node, parent: NodeId, pos: SrcPos) -> NodeId {
        let mut slots = self.slots.borrow_mut();
        let id = NodeId(slots.len() as u32);
        slots.push(Slot { node, parent, pos });
        id
    }

    pub fn root(&self) -> NodeId {
        self.root.get()
    }

    pub fn set_root(&self, id: NodeId) {
        self.root.set(id);
        self.slots.borrow_mut()[id.idx()].parent = NodeId::NONE;
    }

    /// A clone of the node stored at `id`. Node payloads are id lists and
    /// reference-counted handles, so this is cheap.
    pub fn node(&self, id: NodeId) -> Node {
        self.slots.borrow()[id.idx()].node.clone()
    }

    pub fn set_node(&self, id: NodeId, node: Node) {
        self.slots.borrow_mut()[id.idx()].node = node;
    }

    pub fn pos(&self, id: NodeId) -> SrcPos {
        self.slots.borrow()[id.idx()].pos.clone()
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.slots.borrow()[id.idx()].parent
    }

    pub fn set_parent(&self, id: NodeId, parent: NodeId) {
        self.slots.borrow_mut()[id.idx()].parent = parent;
    }

    pub fn is_const(&self, id: NodeId) -> bool {
        matches!(self.slots.borrow()[id.idx()].node, Node::Const(_))
    }

    /// Swaps `old` for `new` in the operand slots of `parent`. Not finding
    /// `old` there means the compiler produced an inconsistent tree; that is
    /// a fatal programming error, never a script error.
    pub fn replace_child(&self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent == NodeId::NONE {
            if self.root.get() != old {
                panic!("nothing to replace: {:?} is not the root", old);
            }
            self.root.set(new);
        } else {
            let replaced = self.slots.borrow_mut()[parent.idx()]
                .node
                .replace_child(old, new);
            if !replaced {
                panic!("nothing to replace: {:?} not found under {:?}", old, parent);
            }
        }
        let mut slots = self.slots.borrow_mut();
        slots[new.idx()].parent = parent;
        // The replaced node is done for; leave a forward so any id still in
        // flight (a loop body mid-iteration) lands on the replacement.
        slots[old.idx()].node = Node::Moved(new);
    }

    /// Replaces `old` in its own parent, the self-rewrite entry point.
    pub fn replace_self(&self, old: NodeId, new: NodeId) {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);
    }

    /// One-line structural rendering, for diagnostics and tests.
    pub fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node {
            Node::Const(v) => format!("Const({:?})", v),
            Node::This => "This".to_string(),
            Node::GetLocal { slot } => format!("GetLocal({})", slot),
            Node::SetLocal { slot, .. } => format!("SetLocal({})", slot),
            Node::GetArg { index } => format!("GetArg({})", index),
            Node::Script { lines } => format!("Script[{}]", lines.len()),
            Node::If { .. } => "If".to_string(),
            Node::While { .. } => "While".to_string(),
            Node::Foreach { .. } => "Foreach".to_string(),
            Node::Return { .. } => "Return".to_string(),
            Node::ReturnText { .. } => "ReturnText".to_string(),
            Node::Eval { operand } => format!("Eval({})", self.describe(operand)),
            Node::LazyCall { name, args, .. } => format!("Lazy({}/{})", name, args.len()),
            Node::CallMethod { entry, .. } => format!("Method({})", entry.name()),
            Node::CallMethodText { entry, .. } => format!("MethodText({})", entry.name()),
            Node::CallMethodTrailing { entry, .. } => {
                format!("MethodTrailing({})", entry.name())
            }
            Node::CallFunction { function, .. } => format!("Function({})", function.name()),
            Node::LazyAddTimer { func_name, .. } => format!("LazyAddTimer({})", func_name),
            Node::AddMethodTimer { entry, .. } => format!("AddMethodTimer({})", entry.name()),
            Node::AddMethodTimerText { entry, .. } => {
                format!("AddMethodTimerText({})", entry.name())
            }
            Node::AddMethodTimerTrailing { entry, .. } => {
                format!("AddMethodTimerTrailing({})", entry.name())
            }
            Node::AddFunctionTimer { function, .. } => {
                format!("AddFunctionTimer({})", function.name())
            }
            Node::AddTriggerTimer { trigger, .. } => {
                format!("AddTriggerTimer({})", trigger.as_str())
            }
            Node::LazyRandom { values, .. } => format!("LazyRandom[{}]", values.len()),
            Node::RandomRange { lo, hi } => format!("RandomRange({}..={})", lo, hi),
            Node::RandomRangeVar { .. } => "RandomRangeVar".to_string(),
            Node::RandomConst { values, .. } => format!("RandomConst[{}]", values.len()),
            Node::RandomVar { values, .. } => format!("RandomVar[{}]", values.len()),
            Node::Moved(target) => self.describe(target),
        }
    }
}
