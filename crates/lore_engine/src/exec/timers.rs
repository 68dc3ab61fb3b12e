use std::rc::Rc;

use lore_core::{
    FormatTemplate, MethodEntry, TimerDescriptor, TimerKey, TimerPayload, TriggerKey, Value,
};
use lore_syntax::{ScriptError, ScriptErrorKind};

use crate::context::{ScriptVars, with_default_self};
use crate::holder::ScriptHolder;
use crate::node::Node;
use crate::resolver::{MemberResolver, ResolvedShape};
use crate::tree::NodeId;

impl ScriptHolder {
    /// First run of an `addtimer` whose callee is a plain name. Resolution
    /// order and blocking rule match the call-site lazy node: instance
    /// method, static method, global function, then the intrinsic library.
    /// Intrinsics really do come last; they are rarely worth running
    /// delayed.
    pub(super) fn run_lazy_add_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        seconds: NodeId,
        func_name: &Rc<str>,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let pos = self.tree.pos(id);
        self.require_host(id, vars)?;
        vars.engine.note_resolution();

        let mut resolver = MemberResolver::new(self, func_name, args);
        let mut resolved = None;

        let acting = vars.self_obj.as_object().cloned();
        if let Some(obj) = acting {
            let vtable = obj.borrow().vtable();
            resolved = resolver.resolve(vars, vtable.instance_entries())?;
            if resolved.is_none() {
                if resolver.name_matched {
                    return Err(
                        self.err(pos, ScriptErrorKind::BadArguments(func_name.to_string()))
                    );
                }
                resolved = resolver.resolve(vars, vtable.static_entries())?;
            }
        }

        let mut function = None;
        if resolved.is_none() {
            function = vars.engine.function(func_name);
        }

        if resolved.is_none() && function.is_none() {
            let library = vars.engine.library().clone();
            resolved = resolver.resolve(vars, library.static_entries())?;
        }

        let new_node = if let Some(found) = resolved {
            match found.shape {
                ResolvedShape::Fixed => Node::AddMethodTimer {
                    key: key.clone(),
                    entry: found.entry,
                    seconds,
                    args: args.to_vec(),
                },
                ResolvedShape::Text => Node::AddMethodTimerText {
                    key: key.clone(),
                    entry: found.entry,
                    seconds,
                    args: args.to_vec(),
                    template: template.clone(),
                },
                ResolvedShape::Trailing => {
                    let head_len = found.entry.trailing_head_len();
                    Node::AddMethodTimerTrailing {
                        key: key.clone(),
                        entry: found.entry,
                        seconds,
                        head: args[..head_len].to_vec(),
                        tail: args[head_len..].to_vec(),
                    }
                }
            }
        } else if let Some(function) = function {
            Node::AddFunctionTimer {
                key: key.clone(),
                function,
                template: template.clone(),
                seconds,
                args: args.to_vec(),
            }
        } else if resolver.name_matched {
            return Err(self.err(pos, ScriptErrorKind::BadArguments(func_name.to_string())));
        } else {
            return Err(
                self.err(pos, ScriptErrorKind::UndefinedIdentifier(func_name.to_string()))
            );
        };

        let new = self.tree.alloc(new_node, self.tree.parent(id), pos);
        for &arg in args {
            self.tree.set_parent(arg, new);
        }
        self.tree.set_parent(seconds, new);
        self.tree.replace_self(id, new);

        match resolver.take_results() {
            Some(results) => self.try_run_node(new, &results, vars),
            None => self.run_node(new, vars),
        }
    }

    /// Method timers evaluate their argument list first, the duration last.
    pub(super) fn run_add_method_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        entry: &Rc<MethodEntry>,
        seconds: NodeId,
        args: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (results, seconds_val) = with_default_self(vars, |vars| {
            let mut out = Vec::with_capacity(args.len());
            for &arg in args {
                out.push(self.run_node(arg, vars)?);
            }
            let seconds_val = self.run_node(seconds, vars)?;
            Ok((out, seconds_val))
        })?;
        self.register_timer(
            id,
            key,
            TimerPayload::Method {
                entry: entry.clone(),
                args: results,
            },
            seconds_val,
            vars,
        )
    }

    pub(super) fn run_add_method_timer_text(
        &self,
        id: NodeId,
        key: &TimerKey,
        entry: &Rc<MethodEntry>,
        seconds: NodeId,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (results, seconds_val) = with_default_self(vars, |vars| {
            let mut out = Vec::with_capacity(args.len());
            for &arg in args {
                out.push(self.run_node(arg, vars)?);
            }
            let seconds_val = self.run_node(seconds, vars)?;
            Ok((out, seconds_val))
        })?;
        let text = Value::str(template.render(&results));
        self.register_timer(
            id,
            key,
            TimerPayload::Method {
                entry: entry.clone(),
                args: vec![text],
            },
            seconds_val,
            vars,
        )
    }

    pub(super) fn run_add_method_timer_trailing(
        &self,
        id: NodeId,
        key: &TimerKey,
        entry: &Rc<MethodEntry>,
        seconds: NodeId,
        head: &[NodeId],
        tail: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (mut results, tail_values, seconds_val) = with_default_self(vars, |vars| {
            let mut head_out = Vec::with_capacity(head.len() + 1);
            for &arg in head {
                head_out.push(self.run_node(arg, vars)?);
            }
            let mut tail_out = Vec::with_capacity(tail.len());
            for &arg in tail {
                tail_out.push(self.run_node(arg, vars)?);
            }
            let seconds_val = self.run_node(seconds, vars)?;
            Ok((head_out, tail_out, seconds_val))
        })?;
        let bound_tail = self.bind_trailing(id, entry, 0, &tail_values)?;
        results.extend(bound_tail);
        self.register_timer(
            id,
            key,
            TimerPayload::Method {
                entry: entry.clone(),
                args: results,
            },
            seconds_val,
            vars,
        )
    }

    /// Function timers evaluate the duration first, the arguments after.
    pub(super) fn run_add_function_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        function: &Rc<ScriptHolder>,
        template: &Rc<FormatTemplate>,
        seconds: NodeId,
        args: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (seconds_val, results) = with_default_self(vars, |vars| {
            let seconds_val = self.run_node(seconds, vars)?;
            let mut out = Vec::with_capacity(args.len());
            for &arg in args {
                out.push(self.run_node(arg, vars)?);
            }
            Ok((seconds_val, out))
        })?;
        let text = template.render(&results);
        self.register_timer(
            id,
            key,
            TimerPayload::Function {
                function: function.clone(),
                text,
                args: results,
            },
            seconds_val,
            vars,
        )
    }

    /// Trigger timers evaluate the duration first, the arguments after.
    pub(super) fn run_add_trigger_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        trigger: &TriggerKey,
        template: &Rc<FormatTemplate>,
        seconds: NodeId,
        args: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (seconds_val, results) = with_default_self(vars, |vars| {
            let seconds_val = self.run_node(seconds, vars)?;
            let mut out = Vec::with_capacity(args.len());
            for &arg in args {
                out.push(self.run_node(arg, vars)?);
            }
            Ok((seconds_val, out))
        })?;
        let text = template.render(&results);
        self.register_timer(
            id,
            key,
            TimerPayload::Trigger {
                trigger: trigger.clone(),
                text,
                args: results,
            },
            seconds_val,
            vars,
        )
    }

    // Fast re-entries: the argument values were already evaluated by the
    // lazy predecessor, only the duration still needs evaluating.

    pub(super) fn finish_method_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        entry: &Rc<MethodEntry>,
        seconds: NodeId,
        args: Vec<Value>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let seconds_val = with_default_self(vars, |vars| self.run_node(seconds, vars))?;
        self.register_timer(
            id,
            key,
            TimerPayload::Method {
                entry: entry.clone(),
                args,
            },
            seconds_val,
            vars,
        )
    }

    pub(super) fn finish_function_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        function: &Rc<ScriptHolder>,
        template: &Rc<FormatTemplate>,
        seconds: NodeId,
        args: Vec<Value>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let seconds_val = with_default_self(vars, |vars| self.run_node(seconds, vars))?;
        let text = template.render(&args);
        self.register_timer(
            id,
            key,
            TimerPayload::Function {
                function: function.clone(),
                text,
                args,
            },
            seconds_val,
            vars,
        )
    }

    pub(super) fn finish_trigger_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        trigger: &TriggerKey,
        template: &Rc<FormatTemplate>,
        seconds: NodeId,
        args: Vec<Value>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let seconds_val = with_default_self(vars, |vars| self.run_node(seconds, vars))?;
        let text = template.render(&args);
        self.register_timer(
            id,
            key,
            TimerPayload::Trigger {
                trigger: trigger.clone(),
                text,
                args,
            },
            seconds_val,
            vars,
        )
    }

    fn require_host(&self, id: NodeId, vars: &mut ScriptVars<'_>) -> Result<(), ScriptError> {
        let is_host = match &vars.self_obj {
            Value::Object(obj) => obj.borrow_mut().as_attachment_host().is_some(),
            _ => false,
        };
        if is_host {
            Ok(())
        } else {
            Err(self.err(
                self.tree.pos(id),
                ScriptErrorKind::NotAttachmentHost(vars.self_obj.type_name().to_string()),
            ))
        }
    }

    /// Converts the duration, builds the descriptor and hands it to the
    /// acting object. The descriptor is the timer subsystem's from here on;
    /// the script gets the timer value back as the construct's result.
    fn register_timer(
        &self,
        id: NodeId,
        key: &TimerKey,
        payload: TimerPayload,
        seconds_val: Value,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let seconds = seconds_val.to_f64().ok_or_else(|| {
            self.err(
                self.tree.pos(id),
                ScriptErrorKind::InvalidDuration(seconds_val.type_name().to_string()),
            )
        })?;
        let timer = Rc::new(TimerDescriptor::new(key.clone(), payload));
        timer.set_due_secs(seconds);
        match &vars.self_obj {
            Value::Object(obj) => {
                let mut obj = obj.borrow_mut();
                let type_name = obj.vtable().name();
                match obj.as_attachment_host() {
                    Some(host) => {
                        host.add_timer(key.clone(), timer.clone());
                        Ok(Value::Timer(timer))
                    }
                    None => Err(self.err(
                        self.tree.pos(id),
                        ScriptErrorKind::NotAttachmentHost(type_name.to_string()),
                    )),
                }
            }
            other => Err(self.err(
                self.tree.pos(id),
                ScriptErrorKind::NotAttachmentHost(other.type_name().to_string()),
            )),
        }
    }
}
