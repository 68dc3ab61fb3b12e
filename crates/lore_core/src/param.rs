use crate::value::Value;

/// Declared parameter type of a registered member, used both to check a
/// call-site's evaluated arguments against an overload and to coerce the
/// collected tail of a trailing-array call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Int,
    Float,
    /// Either numeric representation.
    Num,
    Str,
    List,
    /// An object whose capability table carries the given type name.
    Object(&'static str),
}

impl ParamType {
    /// Whether a value can bind to this parameter. Null binds anywhere (the
    /// caller may legitimately pass nothing), and numbers bind to any
    /// numeric parameter regardless of representation.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ParamType::Any, _) => true,
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::Int | ParamType::Float | ParamType::Num, v) => v.is_number(),
            (ParamType::Str, Value::Str(_)) => true,
            (ParamType::List, Value::List(_)) => true,
            (ParamType::Object(name), Value::Object(o)) => o.borrow().vtable().name() == name,
            _ => false,
        }
    }

    /// Converts a matching value into this parameter's representation.
    /// Returns `None` when the value does not bind at all.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        if !self.matches(value) {
            return None;
        }
        match self {
            ParamType::Int => match value {
                Value::Float(f) => Some(Value::Int(*f as i64)),
                other => Some(other.clone()),
            },
            ParamType::Float => match value {
                Value::Int(i) => Some(Value::Float(*i as f64)),
                other => Some(other.clone()),
            },
            _ => Some(value.clone()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamType::Any => "any",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Num => "num",
            ParamType::Str => "str",
            ParamType::List => "list",
            ParamType::Object(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_bind_across_representations() {
        assert!(ParamType::Int.matches(&Value::Float(2.5)));
        assert!(ParamType::Float.matches(&Value::Int(2)));
        assert!(!ParamType::Int.matches(&Value::str("2")));
    }

    #[test]
    fn null_binds_to_everything() {
        assert!(ParamType::Str.matches(&Value::Null));
        assert!(ParamType::Object("npc").matches(&Value::Null));
    }

    #[test]
    fn coerce_narrows_and_widens() {
        assert_eq!(ParamType::Int.coerce(&Value::Float(2.9)), Some(Value::Int(2)));
        assert_eq!(ParamType::Float.coerce(&Value::Int(3)), Some(Value::Float(3.0)));
        assert_eq!(ParamType::Str.coerce(&Value::Int(3)), None);
    }
}
