/// Everything the interpreter can report to a script author.
///
/// Tree-invariant violations ("nothing to replace") are deliberately absent:
/// those indicate a compiler bug, panic immediately and are never mapped to a
/// script-level error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptErrorKind {
    // Resolution
    UndefinedIdentifier(String),
    BadArguments(String),

    // Control constructs
    NonIterableSource {
        source: String,
        actual: String,
    },

    // Timers
    InvalidDuration(String),
    NotAttachmentHost(String),

    // Compilation
    UncompilableNode(String),

    // Script registry
    FunctionAlreadyExists(String),
    HolderUnloaded(String),

    // A native method or function signalled failure
    NativeFailure {
        what: String,
        detail: String,
    },

    Raw(String),
}

pub struct ErrorFormatter;

impl ErrorFormatter {
    pub fn format(kind: &ScriptErrorKind) -> String {
        match kind {
            ScriptErrorKind::UndefinedIdentifier(name) => {
                format!("Undefined identifier '{}'", name)
            }
            ScriptErrorKind::BadArguments(name) => {
                format!("Member '{}' is getting bad arguments", name)
            }
            ScriptErrorKind::NonIterableSource { source, actual } => {
                format!(
                    "Loop source '{}' did not produce a sequence (got {})",
                    source, actual
                )
            }
            ScriptErrorKind::InvalidDuration(actual) => {
                format!("Timer duration must be numeric, got {}", actual)
            }
            ScriptErrorKind::NotAttachmentHost(actual) => {
                format!("Timers can only be attached to a host object, not {}", actual)
            }
            ScriptErrorKind::UncompilableNode(what) => {
                format!(
                    "Uncompilable node. Expression '{}' is probably used in an invalid way",
                    what
                )
            }
            ScriptErrorKind::FunctionAlreadyExists(name) => {
                format!("Function '{}' already exists", name)
            }
            ScriptErrorKind::HolderUnloaded(name) => {
                format!("Function/trigger '{}' is unloaded, can not be run", name)
            }
            ScriptErrorKind::NativeFailure { what, detail } => {
                format!("Exception while calling '{}': {}", what, detail)
            }
            ScriptErrorKind::Raw(s) => s.clone(),
        }
    }
}
