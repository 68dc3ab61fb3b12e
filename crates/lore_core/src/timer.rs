use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::keys::{TimerKey, TriggerKey};
use crate::value::Value;
use crate::vtable::MethodEntry;

/// Identity of a registered global script function, as carried inside a
/// timer payload. The scheduling subsystem resolves it back through the
/// engine when the timer fires.
pub trait ScriptFunction {
    fn name(&self) -> &str;
}

/// The deferred-call payload of a scheduled timer. Argument values are
/// evaluated at scheduling time; the string-bound flavors additionally carry
/// the pre-rendered argument text.
pub enum TimerPayload {
    /// Fires a resolved member of the host's type.
    Method {
        entry: Rc<MethodEntry>,
        args: Vec<Value>,
    },
    /// Fires a global script function with the rendered argument text and
    /// the raw values.
    Function {
        function: Rc<dyn ScriptFunction>,
        text: String,
        args: Vec<Value>,
    },
    /// Fires a named trigger on the host.
    Trigger {
        trigger: TriggerKey,
        text: String,
        args: Vec<Value>,
    },
}

impl fmt::Debug for TimerPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerPayload::Method { entry, args } => {
                write!(f, "Method({}, {} args)", entry.name(), args.len())
            }
            TimerPayload::Function { function, args, .. } => {
                write!(f, "Function({}, {} args)", function.name(), args.len())
            }
            TimerPayload::Trigger { trigger, args, .. } => {
                write!(f, "Trigger({}, {} args)", trigger.as_str(), args.len())
            }
        }
    }
}

/// What the interpreter hands to the external timer subsystem: a key, a
/// settable due-time in seconds, and a bound payload. Ownership transfers to
/// the attachment host the moment it is registered.
#[derive(Debug)]
pub struct TimerDescriptor {
    pub key: TimerKey,
    due_secs: Cell<f64>,
    pub payload: TimerPayload,
}

impl TimerDescriptor {
    pub fn new(key: TimerKey, payload: TimerPayload) -> Self {
        Self {
            key,
            due_secs: Cell::new(0.0),
            payload,
        }
    }

    pub fn set_due_secs(&self, seconds: f64) {
        self.due_secs.set(seconds);
    }

    pub fn due_secs(&self) -> f64 {
        self.due_secs.get()
    }
}
