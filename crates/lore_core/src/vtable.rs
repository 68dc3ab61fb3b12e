use std::fmt;
use std::rc::Rc;

use crate::param::ParamType;
use crate::value::Value;

pub type NativeResult = Result<Value, String>;

type InvokeFn = Rc<dyn Fn(&Value, &[Value]) -> NativeResult>;

/// How a member binds its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingShape {
    /// One declared type per argument, bound positionally.
    Fixed(Box<[ParamType]>),
    /// A single string parameter; call sites with several heterogeneous
    /// arguments fold them into one string through a format template.
    Text,
    /// Fixed head parameters plus a variable-length tail collected into one
    /// list of the declared element type.
    Trailing {
        head: Box<[ParamType]>,
        elem: ParamType,
    },
}

/// One registered member of a capability table, pre-classified by binding
/// shape at registration time.
pub struct MethodEntry {
    name: Box<str>,
    pub shape: BindingShape,
    pub ret: ParamType,
    invoke: InvokeFn,
}

impl MethodEntry {
    pub fn fixed(
        name: &str,
        params: Vec<ParamType>,
        invoke: impl Fn(&Value, &[Value]) -> NativeResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shape: BindingShape::Fixed(params.into_boxed_slice()),
            ret: ParamType::Any,
            invoke: Rc::new(invoke),
        }
    }

    pub fn text(
        name: &str,
        invoke: impl Fn(&Value, &[Value]) -> NativeResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shape: BindingShape::Text,
            ret: ParamType::Any,
            invoke: Rc::new(invoke),
        }
    }

    pub fn trailing(
        name: &str,
        head: Vec<ParamType>,
        elem: ParamType,
        invoke: impl Fn(&Value, &[Value]) -> NativeResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shape: BindingShape::Trailing {
                head: head.into_boxed_slice(),
                elem,
            },
            ret: ParamType::Any,
            invoke: Rc::new(invoke),
        }
    }

    pub fn returning(mut self, ret: ParamType) -> Self {
        self.ret = ret;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script identifiers are case-insensitive.
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.eq_ignore_ascii_case(candidate)
    }

    pub fn invoke(&self, target: &Value, args: &[Value]) -> NativeResult {
        (self.invoke)(target, args)
    }

    /// Number of positionally-bound parameters before the collected tail;
    /// zero for non-trailing shapes.
    pub fn trailing_head_len(&self) -> usize {
        match &self.shape {
            BindingShape::Trailing { head, .. } => head.len(),
            _ => 0,
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.name, self.shape)
    }
}

/// The capability table of one exposed type: instance members and static
/// members, in registration order. Built once per type; member resolution is
/// a pure lookup plus shape check against it.
pub struct TypeVtable {
    name: &'static str,
    instance: Vec<Rc<MethodEntry>>,
    statics: Vec<Rc<MethodEntry>>,
}

impl TypeVtable {
    pub fn builder(name: &'static str) -> TypeVtableBuilder {
        TypeVtableBuilder {
            name,
            instance: Vec::new(),
            statics: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instance_entries(&self) -> &[Rc<MethodEntry>] {
        &self.instance
    }

    pub fn static_entries(&self) -> &[Rc<MethodEntry>] {
        &self.statics
    }
}

pub struct TypeVtableBuilder {
    name: &'static str,
    instance: Vec<Rc<MethodEntry>>,
    statics: Vec<Rc<MethodEntry>>,
}

impl TypeVtableBuilder {
    pub fn instance(mut self, entry: MethodEntry) -> Self {
        self.instance.push(Rc::new(entry));
        self
    }

    pub fn static_method(mut self, entry: MethodEntry) -> Self {
        self.statics.push(Rc::new(entry));
        self
    }

    pub fn build(self) -> Rc<TypeVtable> {
        Rc::new(TypeVtable {
            name: self.name,
            instance: self.instance,
            statics: self.statics,
        })
    }
}
