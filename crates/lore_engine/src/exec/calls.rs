use std::rc::Rc;

use lore_core::{BindingShape, FormatTemplate, MethodEntry, Value};
use lore_syntax::ScriptError;

use crate::context::{ScriptArgs, ScriptVars};
use crate::holder::ScriptHolder;
use crate::tree::NodeId;

impl ScriptHolder {
    pub(super) fn invoke_entry(
        &self,
        id: NodeId,
        entry: &Rc<MethodEntry>,
        target: &Value,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        entry
            .invoke(target, args)
            .map_err(|detail| self.native_err(id, entry.name(), detail))
    }

    /// Rebinds pre-evaluated trailing-call arguments: the head stays
    /// positional, the tail is coerced to the declared element type and
    /// collected into one list value.
    pub(super) fn bind_trailing(
        &self,
        id: NodeId,
        entry: &Rc<MethodEntry>,
        head_len: usize,
        results: &[Value],
    ) -> Result<Vec<Value>, ScriptError> {
        let elem = match &entry.shape {
            BindingShape::Trailing { elem, .. } => *elem,
            _ => lore_core::ParamType::Any,
        };
        let mut bound = Vec::with_capacity(head_len + 1);
        bound.extend_from_slice(&results[..head_len.min(results.len())]);
        let mut tail = Vec::with_capacity(results.len().saturating_sub(head_len));
        for value in &results[head_len.min(results.len())..] {
            let coerced = elem.coerce(value).ok_or_else(|| {
                self.native_err(
                    id,
                    entry.name(),
                    format!(
                        "cannot convert {} to {} for the collected tail",
                        value.type_name(),
                        elem.name()
                    ),
                )
            })?;
            tail.push(coerced);
        }
        bound.push(Value::list(tail));
        Ok(bound)
    }

    pub(super) fn run_call_method(
        &self,
        id: NodeId,
        entry: &Rc<MethodEntry>,
        args: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let results = self.eval_args_scoped(args, vars)?;
        self.invoke_entry(id, entry, &vars.self_obj, &results)
    }

    pub(super) fn run_call_method_text(
        &self,
        id: NodeId,
        entry: &Rc<MethodEntry>,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let results = self.eval_args_scoped(args, vars)?;
        let text = Value::str(template.render(&results));
        self.invoke_entry(id, entry, &vars.self_obj, &[text])
    }

    pub(super) fn run_call_method_trailing(
        &self,
        id: NodeId,
        entry: &Rc<MethodEntry>,
        head: &[NodeId],
        tail: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let (mut results, tail_values) = crate::context::with_default_self(vars, |vars| {
            let mut head_out = super::ValueVec::with_capacity(head.len() + 1);
            for &arg in head {
                head_out.push(self.run_node(arg, vars)?);
            }
            let mut tail_out = Vec::with_capacity(tail.len());
            for &arg in tail {
                tail_out.push(self.run_node(arg, vars)?);
            }
            Ok((head_out, tail_out))
        })?;
        let bound_tail = self.bind_trailing(id, entry, 0, &tail_values)?;
        results.extend(bound_tail);
        self.invoke_entry(id, entry, &vars.self_obj, &results)
    }

    pub(super) fn run_call_function(
        &self,
        function: &Rc<ScriptHolder>,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let results = self.eval_args_scoped(args, vars)?;
        self.call_function_with(function, results.to_vec(), template, vars)
    }

    pub(super) fn call_function_with(
        &self,
        function: &Rc<ScriptHolder>,
        results: Vec<Value>,
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let text = template.render(&results);
        function.run(
            vars.engine,
            vars.self_obj.clone(),
            ScriptArgs::new(text, results),
        )
    }
}
