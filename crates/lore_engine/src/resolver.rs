use std::rc::Rc;

use lore_core::{BindingShape, MethodEntry, ParamType, Value};
use lore_syntax::ScriptError;

use crate::context::{ScriptVars, with_default_self};
use crate::holder::ScriptHolder;
use crate::tree::NodeId;

/// Which argument convention a resolved member binds with. `Fixed` is also
/// reported for a text-shape member whose single caller argument already
/// evaluated to a string: formatting it again would be pointless, so the
/// call binds directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResolvedShape {
    Fixed,
    Text,
    Trailing,
}

pub(crate) struct ResolvedMember {
    pub entry: Rc<MethodEntry>,
    pub shape: ResolvedShape,
}

/// Resolves a vague call site (a name plus unevaluated argument nodes)
/// against one section of a capability table at a time.
///
/// Arguments are evaluated at most once across all sections, under the
/// default-identity substitution, and the evaluated values are handed
/// onward so the specialized node can skip re-evaluating them. A name match
/// is reported separately from a usable match; the caller decides whether a
/// matched-but-ill-fitting name stops the search or merely flavors the
/// final error.
pub(crate) struct MemberResolver<'h> {
    holder: &'h ScriptHolder,
    name: &'h str,
    args: &'h [NodeId],
    results: Option<Vec<Value>>,
    pub name_matched: bool,
}

impl<'h> MemberResolver<'h> {
    pub fn new(holder: &'h ScriptHolder, name: &'h str, args: &'h [NodeId]) -> Self {
        Self {
            holder,
            name,
            args,
            results: None,
            name_matched: false,
        }
    }

    /// Evaluates the argument nodes once, left to right, with the acting
    /// object swapped for the default identity. Later calls reuse the
    /// cached values.
    pub fn run_args(&mut self, vars: &mut ScriptVars<'_>) -> Result<&[Value], ScriptError> {
        if self.results.is_none() {
            let holder = self.holder;
            let args = self.args;
            let values = with_default_self(vars, |vars| {
                let mut out = Vec::with_capacity(args.len());
                for &arg in args {
                    out.push(holder.run_node(arg, vars)?);
                }
                Ok(out)
            })?;
            self.results = Some(values);
        }
        Ok(self.results.as_deref().unwrap_or(&[]))
    }

    /// Searches one section for a usable overload: fixed-arity candidates
    /// first, then trailing-array, then text-shape. The first match in
    /// registration order wins. Returns `None` both when the name is
    /// unknown here and when it matched without a usable overload; the two
    /// cases are distinguished by `name_matched`.
    pub fn resolve(
        &mut self,
        vars: &mut ScriptVars<'_>,
        section: &[Rc<MethodEntry>],
    ) -> Result<Option<ResolvedMember>, ScriptError> {
        let named: Vec<Rc<MethodEntry>> = section
            .iter()
            .filter(|e| e.name_matches(self.name))
            .cloned()
            .collect();
        if named.is_empty() {
            return Ok(None);
        }
        self.name_matched = true;
        let argc = self.args.len();

        // Fixed arity. A text-shape member counts as a single-string-fixed
        // candidate here: when the one argument is already a string there is
        // nothing to format.
        for entry in &named {
            match &entry.shape {
                BindingShape::Fixed(params) if params.len() == argc => {
                    let results = self.run_args(vars)?;
                    if params_match(params, results) {
                        return Ok(Some(ResolvedMember {
                            entry: entry.clone(),
                            shape: ResolvedShape::Fixed,
                        }));
                    }
                }
                BindingShape::Text if argc == 1 => {
                    let results = self.run_args(vars)?;
                    if results[0].is_str() || results[0].is_null() {
                        return Ok(Some(ResolvedMember {
                            entry: entry.clone(),
                            shape: ResolvedShape::Fixed,
                        }));
                    }
                }
                _ => {}
            }
        }

        // Trailing array: positional head, tail collected into one list of
        // the declared element type.
        for entry in &named {
            if let BindingShape::Trailing { head, elem } = &entry.shape {
                if argc >= head.len() {
                    let results = self.run_args(vars)?;
                    let head_fits = params_match(head, &results[..head.len()]);
                    let tail_fits = results[head.len()..].iter().all(|v| elem.matches(v));
                    if head_fits && tail_fits {
                        return Ok(Some(ResolvedMember {
                            entry: entry.clone(),
                            shape: ResolvedShape::Trailing,
                        }));
                    }
                }
            }
        }

        // Text shape takes whatever is left, as long as there is something
        // to fold into the string.
        for entry in &named {
            if matches!(entry.shape, BindingShape::Text) && argc > 0 {
                self.run_args(vars)?;
                return Ok(Some(ResolvedMember {
                    entry: entry.clone(),
                    shape: ResolvedShape::Text,
                }));
            }
        }

        Ok(None)
    }

    /// The evaluated argument values, if any section evaluation got that
    /// far. Handed to the specialized node's fast path so work already done
    /// is never repeated.
    pub fn take_results(self) -> Option<Vec<Value>> {
        self.results
    }
}

fn params_match(params: &[ParamType], values: &[Value]) -> bool {
    params.len() == values.len()
        && params
            .iter()
            .zip(values)
            .all(|(param, value)| param.matches(value))
}
