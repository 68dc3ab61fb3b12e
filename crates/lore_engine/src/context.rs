use std::rc::Rc;

use lore_core::Value;
use lore_syntax::ScriptError;

use crate::engine::Engine;

/// Invocation arguments of a triggered script: the raw argument text and the
/// individual values.
#[derive(Clone)]
pub struct ScriptArgs {
    pub text: Rc<str>,
    pub argv: Vec<Value>,
}

impl ScriptArgs {
    pub fn new(text: impl AsRef<str>, argv: Vec<Value>) -> Self {
        Self {
            text: Rc::from(text.as_ref()),
            argv,
        }
    }
}

impl Default for ScriptArgs {
    fn default() -> Self {
        Self {
            text: Rc::from(""),
            argv: Vec::new(),
        }
    }
}

/// Mutable per-invocation state. One instance per top-level run or nested
/// re-entrant call; never shared across concurrent invocations.
pub struct ScriptVars<'e> {
    pub engine: &'e Engine,
    /// The object the script is currently acting on.
    pub self_obj: Value,
    /// The identity evaluation falls back to while argument sub-expressions
    /// of deferred calls must not see the acting object.
    pub default_obj: Value,
    /// Local variable slots, indexed by the compile-time slot table.
    pub locals: Vec<Value>,
    /// Set by `return`; checked by every looping construct.
    pub returned: bool,
    pub args: ScriptArgs,
}

impl<'e> ScriptVars<'e> {
    pub fn new(engine: &'e Engine, self_obj: Value, locals_count: usize, args: ScriptArgs) -> Self {
        Self {
            engine,
            default_obj: self_obj.clone(),
            self_obj,
            locals: vec![Value::Null; locals_count],
            returned: false,
            args,
        }
    }
}

/// Runs `f` with the acting object swapped for the default identity,
/// restoring the original on every exit path, errors included.
pub(crate) fn with_default_self<'e, T>(
    vars: &mut ScriptVars<'e>,
    f: impl FnOnce(&mut ScriptVars<'e>) -> Result<T, ScriptError>,
) -> Result<T, ScriptError> {
    let default = vars.default_obj.clone();
    let saved = std::mem::replace(&mut vars.self_obj, default);
    let res = f(vars);
    vars.self_obj = saved;
    res
}
