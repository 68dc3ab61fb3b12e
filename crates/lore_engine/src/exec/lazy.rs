use std::rc::Rc;

use lore_core::{FormatTemplate, Value};
use lore_syntax::{ScriptError, ScriptErrorKind};

use crate::context::ScriptVars;
use crate::holder::ScriptHolder;
use crate::node::Node;
use crate::resolver::{MemberResolver, ResolvedMember, ResolvedShape};
use crate::tree::NodeId;

impl ScriptHolder {
    /// First (and only) run of an unresolved call site. Resolves the name
    /// in priority order (local slot, instance member, static member,
    /// global script function, intrinsic library), builds the one
    /// specialized node the resolved binding implies, transplants the
    /// argument sub-nodes into it, replaces itself in the tree and
    /// delegates the in-flight call.
    ///
    /// An instance member matched by name but not by arguments stops the
    /// search with a bad-arguments error; a static name match does not
    /// block the function and library steps, it only flavors the final
    /// error when nothing else resolves.
    pub(super) fn run_lazy_call(
        &self,
        id: NodeId,
        name: &Rc<str>,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        must_eval: bool,
        src_text: &Rc<str>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let pos = self.tree.pos(id);
        vars.engine.note_resolution();

        if args.is_empty() {
            if let Some(slot) = self.local_index(name) {
                let new = self
                    .tree
                    .alloc(Node::GetLocal { slot }, self.tree.parent(id), pos);
                self.tree.replace_self(id, new);
                return self.run_node(new, vars);
            }
        }

        let mut resolver = MemberResolver::new(self, name, args);
        let mut resolved: Option<ResolvedMember> = None;

        let acting = vars.self_obj.as_object().cloned();
        if let Some(obj) = acting {
            let vtable = obj.borrow().vtable();
            resolved = resolver.resolve(vars, vtable.instance_entries())?;
            if resolved.is_none() {
                if resolver.name_matched {
                    return Err(self.err(pos, ScriptErrorKind::BadArguments(name.to_string())));
                }
                resolved = resolver.resolve(vars, vtable.static_entries())?;
            }
        }

        let mut function = None;
        if resolved.is_none() {
            function = vars.engine.function(name);
        }

        if resolved.is_none() && function.is_none() {
            let library = vars.engine.library().clone();
            resolved = resolver.resolve(vars, library.static_entries())?;
        }

        let new_node = if let Some(found) = resolved {
            self.specialized_call(found, args, template)
        } else if let Some(function) = function {
            Node::CallFunction {
                function,
                args: args.to_vec(),
                template: template.clone(),
            }
        } else if !must_eval {
            // An unresolvable bare word is its own text.
            let text = Value::str(src_text.as_ref());
            let new = self
                .tree
                .alloc(Node::Const(text.clone()), self.tree.parent(id), pos);
            self.tree.replace_self(id, new);
            return Ok(text);
        } else if resolver.name_matched {
            return Err(self.err(pos, ScriptErrorKind::BadArguments(name.to_string())));
        } else {
            return Err(self.err(pos, ScriptErrorKind::UndefinedIdentifier(name.to_string())));
        };

        let new = self.tree.alloc(new_node, self.tree.parent(id), pos);
        for &arg in args {
            self.tree.set_parent(arg, new);
        }
        self.tree.replace_self(id, new);

        match resolver.take_results() {
            Some(results) if !results.is_empty() => self.try_run_node(new, &results, vars),
            _ => self.run_node(new, vars),
        }
    }

    pub(super) fn specialized_call(
        &self,
        found: ResolvedMember,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
    ) -> Node {
        match found.shape {
            ResolvedShape::Fixed => Node::CallMethod {
                entry: found.entry,
                args: args.to_vec(),
            },
            ResolvedShape::Text => Node::CallMethodText {
                entry: found.entry,
                args: args.to_vec(),
                template: template.clone(),
            },
            ResolvedShape::Trailing => {
                let head_len = found.entry.trailing_head_len();
                Node::CallMethodTrailing {
                    entry: found.entry,
                    head: args[..head_len].to_vec(),
                    tail: args[head_len..].to_vec(),
                }
            }
        }
    }
}
