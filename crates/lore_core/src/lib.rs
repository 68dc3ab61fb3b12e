//! Runtime value model and world-facing surface of the LoreScript engine:
//! values, per-type capability tables, binding shapes, timer descriptors and
//! the intrinsic library.

mod fmt;
mod intrinsics;
mod keys;
mod object;
mod param;
mod timer;
mod value;
mod vtable;

pub use fmt::{FormatTemplate, TemplateBuilder};
pub use intrinsics::default_library;
pub use keys::{TimerKey, TriggerKey};
pub use object::{AttachmentHost, ObjRef, ScriptObject};
pub use param::ParamType;
pub use timer::{ScriptFunction, TimerDescriptor, TimerPayload};
pub use value::Value;
pub use vtable::{BindingShape, MethodEntry, NativeResult, TypeVtable, TypeVtableBuilder};
