use std::rc::Rc;

use lore_core::{FormatTemplate, Value};
use lore_syntax::{ScriptError, ScriptErrorKind};

use crate::context::ScriptVars;
use crate::holder::ScriptHolder;
use crate::tree::NodeId;

impl ScriptHolder {
    pub(super) fn run_script(
        &self,
        lines: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let mut last = Value::Null;
        for &line in lines {
            last = self.run_node(line, vars)?;
            if vars.returned {
                break;
            }
        }
        Ok(last)
    }

    pub(super) fn run_if(
        &self,
        cond: NodeId,
        then_body: Option<NodeId>,
        else_body: Option<NodeId>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let taken = if self.run_node(cond, vars)?.truthy() {
            then_body
        } else {
            else_body
        };
        match taken {
            Some(body) => self.run_node(body, vars),
            None => Ok(Value::Null),
        }
    }

    pub(super) fn run_while(
        &self,
        cond: NodeId,
        body: Option<NodeId>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        loop {
            if vars.returned || !self.run_node(cond, vars)?.truthy() {
                break;
            }
            if let Some(body) = body {
                self.run_node(body, vars)?;
            } else {
                break;
            }
        }
        Ok(Value::Null)
    }

    /// One loop entry: the source expression is evaluated exactly once and
    /// must yield a sequence; each element is stored into the fixed local
    /// slot before the body runs. The loop's value is the last body value.
    pub(super) fn run_foreach(
        &self,
        id: NodeId,
        slot: usize,
        source: NodeId,
        source_desc: &str,
        body: Option<NodeId>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let source_val = self.run_node(source, vars)?;
        let items: Vec<Value> = match &source_val {
            Value::List(items) => items.borrow().clone(),
            other => {
                return Err(self.err(
                    self.tree.pos(id),
                    ScriptErrorKind::NonIterableSource {
                        source: source_desc.to_string(),
                        actual: other.type_name().to_string(),
                    },
                ));
            }
        };
        let Some(body) = body else {
            return Ok(Value::Null);
        };
        let mut last = Value::Null;
        for item in items {
            if vars.returned {
                break;
            }
            if slot >= vars.locals.len() {
                vars.locals.resize(slot + 1, Value::Null);
            }
            vars.locals[slot] = item;
            last = self.run_node(body, vars)?;
        }
        Ok(last)
    }

    pub(super) fn run_return(
        &self,
        value: Option<NodeId>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let result = match value {
            Some(value) => self.run_node(value, vars)?,
            None => Value::Null,
        };
        vars.returned = true;
        Ok(result)
    }

    pub(super) fn run_return_text(
        &self,
        args: &[NodeId],
        template: &Rc<FormatTemplate>,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let mut results = Vec::with_capacity(args.len());
        for &arg in args {
            results.push(self.run_node(arg, vars)?);
        }
        vars.returned = true;
        Ok(Value::str(template.render(&results)))
    }

    pub(super) fn run_set_local(
        &self,
        slot: usize,
        value: NodeId,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let v = self.run_node(value, vars)?;
        if slot >= vars.locals.len() {
            vars.locals.resize(slot + 1, Value::Null);
        }
        vars.locals[slot] = v.clone();
        Ok(v)
    }
}
