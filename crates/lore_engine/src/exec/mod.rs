//! Execution of compiled nodes, split by node family. Every entry point is
//! a method on `ScriptHolder`, which owns the tree being run.

mod calls;
mod flow;
mod lazy;
mod random;
mod timers;

use smallvec::SmallVec;

use lore_core::Value;
use lore_syntax::{ScriptError, ScriptErrorKind};

use crate::context::{ScriptVars, with_default_self};
use crate::holder::ScriptHolder;
use crate::node::Node;
use crate::tree::NodeId;

pub(crate) type ValueVec = SmallVec<[Value; 4]>;

impl ScriptHolder {
    /// Runs one node. May have side effects, and for the lazy variants may
    /// replace the node in the tree before delegating to its specialized
    /// successor.
    pub(crate) fn run_node(
        &self,
        id: NodeId,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let node = self.tree.node(id);
        match node {
            Node::Const(v) => Ok(v),
            Node::This => Ok(vars.self_obj.clone()),
            Node::Moved(target) => self.run_node(target, vars),
            Node::GetLocal { slot } => {
                Ok(vars.locals.get(slot).cloned().unwrap_or(Value::Null))
            }
            Node::SetLocal { slot, value } => self.run_set_local(slot, value, vars),
            Node::GetArg { index } => {
                Ok(vars.args.argv.get(index).cloned().unwrap_or(Value::Null))
            }
            Node::Script { lines } => self.run_script(&lines, vars),
            Node::If {
                cond,
                then_body,
                else_body,
            } => self.run_if(cond, then_body, else_body, vars),
            Node::While { cond, body } => self.run_while(cond, body, vars),
            Node::Foreach {
                slot,
                source,
                source_desc,
                body,
            } => self.run_foreach(id, slot, source, &source_desc, body, vars),
            Node::Return { value } => self.run_return(value, vars),
            Node::ReturnText { args, template } => self.run_return_text(&args, &template, vars),
            Node::Eval { operand } => self.run_node(operand, vars),
            Node::LazyCall {
                name,
                args,
                template,
                must_eval,
                src_text,
            } => self.run_lazy_call(id, &name, &args, &template, must_eval, &src_text, vars),
            Node::CallMethod { entry, args } => self.run_call_method(id, &entry, &args, vars),
            Node::CallMethodText {
                entry,
                args,
                template,
            } => self.run_call_method_text(id, &entry, &args, &template, vars),
            Node::CallMethodTrailing { entry, head, tail } => {
                self.run_call_method_trailing(id, &entry, &head, &tail, vars)
            }
            Node::CallFunction {
                function,
                args,
                template,
            } => self.run_call_function(&function, &args, &template, vars),
            Node::LazyAddTimer {
                key,
                seconds,
                func_name,
                args,
                template,
            } => self.run_lazy_add_timer(id, &key, seconds, &func_name, &args, &template, vars),
            Node::AddMethodTimer {
                key,
                entry,
                seconds,
                args,
            } => self.run_add_method_timer(id, &key, &entry, seconds, &args, vars),
            Node::AddMethodTimerText {
                key,
                entry,
                seconds,
                args,
                template,
            } => self.run_add_method_timer_text(id, &key, &entry, seconds, &args, &template, vars),
            Node::AddMethodTimerTrailing {
                key,
                entry,
                seconds,
                head,
                tail,
            } => self.run_add_method_timer_trailing(id, &key, &entry, seconds, &head, &tail, vars),
            Node::AddFunctionTimer {
                key,
                function,
                template,
                seconds,
                args,
            } => self.run_add_function_timer(id, &key, &function, &template, seconds, &args, vars),
            Node::AddTriggerTimer {
                key,
                trigger,
                template,
                seconds,
                args,
            } => self.run_add_trigger_timer(id, &key, &trigger, &template, seconds, &args, vars),
            Node::LazyRandom {
                values,
                odds,
                simple,
            } => self.run_lazy_random(id, &values, &odds, simple, vars),
            Node::RandomRange { lo, hi } => Ok(Value::Int(vars.engine.roll(lo, hi))),
            Node::RandomRangeVar { lo, hi } => self.run_random_range_var(id, lo, hi, vars),
            Node::RandomConst {
                values,
                cumulative,
                total,
            } => self.run_random_const(&values, &cumulative, total, vars),
            Node::RandomVar { values, odds } => self.run_random_var(id, &values, &odds, vars),
        }
    }

    /// Fast re-entry for a freshly specialized node when the lazy
    /// predecessor already evaluated the argument values: whatever was
    /// evaluated in step one is forwarded, never evaluated twice.
    pub(crate) fn try_run_node(
        &self,
        id: NodeId,
        results: &[Value],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let node = self.tree.node(id);
        match node {
            Node::CallMethod { entry, .. } => self.invoke_entry(id, &entry, &vars.self_obj, results),
            Node::CallMethodText {
                entry, template, ..
            } => {
                let text = Value::str(template.render(results));
                self.invoke_entry(id, &entry, &vars.self_obj, &[text])
            }
            Node::CallMethodTrailing { entry, head, .. } => {
                let bound = self.bind_trailing(id, &entry, head.len(), results)?;
                self.invoke_entry(id, &entry, &vars.self_obj, &bound)
            }
            Node::CallFunction {
                function, template, ..
            } => self.call_function_with(&function, results.to_vec(), &template, vars),
            Node::AddMethodTimer {
                key, entry, seconds, ..
            } => self.finish_method_timer(id, &key, &entry, seconds, results.to_vec(), vars),
            Node::AddMethodTimerText {
                key,
                entry,
                seconds,
                template,
                ..
            } => {
                let text = Value::str(template.render(results));
                self.finish_method_timer(id, &key, &entry, seconds, vec![text], vars)
            }
            Node::AddMethodTimerTrailing {
                key,
                entry,
                seconds,
                head,
                ..
            } => {
                let bound = self.bind_trailing(id, &entry, head.len(), results)?;
                self.finish_method_timer(id, &key, &entry, seconds, bound, vars)
            }
            Node::AddFunctionTimer {
                key,
                function,
                template,
                seconds,
                ..
            } => self.finish_function_timer(
                id,
                &key,
                &function,
                &template,
                seconds,
                results.to_vec(),
                vars,
            ),
            Node::AddTriggerTimer {
                key,
                trigger,
                template,
                seconds,
                ..
            } => self.finish_trigger_timer(
                id,
                &key,
                &trigger,
                &template,
                seconds,
                results.to_vec(),
                vars,
            ),
            _ => self.run_node(id, vars),
        }
    }

    /// Evaluates a list of operand nodes left to right with the acting
    /// object swapped for the default identity, restoring it afterwards
    /// even when an operand raises.
    pub(crate) fn eval_args_scoped(
        &self,
        args: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<ValueVec, ScriptError> {
        with_default_self(vars, |vars| {
            let mut out = ValueVec::with_capacity(args.len());
            for &arg in args {
                out.push(self.run_node(arg, vars)?);
            }
            Ok(out)
        })
    }

    pub(crate) fn native_err(&self, id: NodeId, what: &str, detail: String) -> ScriptError {
        self.err(
            self.tree.pos(id),
            ScriptErrorKind::NativeFailure {
                what: what.to_string(),
                detail,
            },
        )
    }
}
