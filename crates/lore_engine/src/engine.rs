use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use lore_core::{TypeVtable, Value, default_library};
use lore_syntax::{ScriptError, ScriptErrorKind};
use lore_tree::ParseNode;

use crate::context::{ScriptArgs, ScriptVars};
use crate::holder::ScriptHolder;

/// Pluggable random source for `random` expressions; stateless over an
/// externally held state word so tests can substitute a deterministic one.
pub trait RngAlgorithm {
    fn next_u64(&self, state: &mut u64) -> u64;
}

struct SplitMix64;

impl RngAlgorithm for SplitMix64 {
    fn next_u64(&self, state: &mut u64) -> u64 {
        *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = *state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// The world the interpreter runs against: the global script-function
/// registry and the intrinsic library surface.
///
/// The engine performs no internal parallelism; script executions against
/// it are expected to be serialized by the embedding server.
pub struct Engine {
    functions: IndexMap<String, Rc<ScriptHolder>>,
    library: Rc<TypeVtable>,
    resolutions: Cell<u64>,
    rng: Box<dyn RngAlgorithm>,
    rng_state: Cell<u64>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_library(default_library())
    }

    pub fn with_library(library: Rc<TypeVtable>) -> Self {
        Self {
            functions: IndexMap::new(),
            library,
            resolutions: Cell::new(0),
            rng: Box::new(SplitMix64),
            rng_state: Cell::new(0x5DEE_CE66_D),
        }
    }

    pub fn set_rng_algorithm(&mut self, rng: Box<dyn RngAlgorithm>) {
        self.rng = rng;
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng_state.set(seed);
    }

    pub fn library(&self) -> &Rc<TypeVtable> {
        &self.library
    }

    /// Lookup of a registered global script function, case-insensitive.
    pub fn function(&self, name: &str) -> Option<Rc<ScriptHolder>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Registers a compiled holder as a global function. Re-registering a
    /// live name is an error; replacing an unloaded one is how reloads work.
    pub fn define_function(&mut self, holder: Rc<ScriptHolder>) -> Result<(), ScriptError> {
        let key = holder.name().to_ascii_lowercase();
        if let Some(existing) = self.functions.get(&key) {
            if !existing.is_unloaded() {
                return Err(ScriptError::new(
                    ScriptErrorKind::FunctionAlreadyExists(holder.name().to_string()),
                    holder.origin_pos(),
                    holder.decorated_name(),
                ));
            }
        }
        self.functions.insert(key, holder);
        Ok(())
    }

    /// How many lazy-node resolutions this engine has performed. A fixed
    /// tree position resolves at most once, so re-running compiled scripts
    /// leaves this counter unchanged.
    pub fn resolutions(&self) -> u64 {
        self.resolutions.get()
    }

    pub(crate) fn note_resolution(&self) {
        self.resolutions.set(self.resolutions.get() + 1);
    }

    /// Uniform roll in `lo..=hi`.
    pub(crate) fn roll(&self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo + 1) as u64;
        let mut state = self.rng_state.get();
        let r = self.rng.next_u64(&mut state);
        self.rng_state.set(state);
        lo + (r % span) as i64
    }

    /// Compiles and immediately runs one parse tree against `self_obj`,
    /// returning the last evaluated value. The throwaway holder is dropped
    /// afterwards, so the specialization work is not reused.
    pub fn run_snippet(
        &self,
        filename: &str,
        start_line: u32,
        self_obj: Value,
        code: &ParseNode,
    ) -> Result<Value, ScriptError> {
        let holder = ScriptHolder::compile("<snippet>", filename, start_line, code)?;
        let mut vars = ScriptVars::new(self, self_obj, holder.locals_count(), ScriptArgs::default());
        holder.run_with(&mut vars)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
