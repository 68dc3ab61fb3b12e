use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::keys::TimerKey;
use crate::timer::TimerDescriptor;
use crate::vtable::TypeVtable;

/// Shared handle to a live game object.
pub type ObjRef = Rc<RefCell<dyn ScriptObject>>;

/// A game object that scripts can act on.
///
/// Each implementing type exposes one capability table, built once at
/// registration time; member resolution is a lookup against it, never
/// runtime type introspection.
pub trait ScriptObject: Any {
    fn vtable(&self) -> Rc<TypeVtable>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Objects able to host scheduled timers return their attachment
    /// surface; everything else is rejected with a capability error when a
    /// timer construct targets it.
    fn as_attachment_host(&mut self) -> Option<&mut dyn AttachmentHost> {
        None
    }
}

/// The attachment surface of a plugin-bearing object. Registration is
/// fire-and-forget: ownership of the descriptor transfers to the host's
/// timer subsystem immediately.
pub trait AttachmentHost {
    fn add_timer(&mut self, key: TimerKey, timer: Rc<TimerDescriptor>);
}
