use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::object::ObjRef;
use crate::timer::TimerDescriptor;

/// A runtime script value.
///
/// Values are cheap to clone: strings and aggregates are reference-counted,
/// scalars are inline. The interpreter is single-threaded per execution, so
/// `Rc`/`RefCell` sharing is sufficient.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Object(ObjRef),
    Timer(Rc<TimerDescriptor>),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Timer(_) => "timer",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Numeric view of the value, the loose way scripts expect: ints and
    /// floats convert directly, numeric strings parse.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Script truthiness: null, false, zero and the empty string are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Appends the display form of the value to `out`.
    pub fn append_to(&self, out: &mut String) {
        match self {
            Value::Null => {}
            Value::Bool(b) => out.push_str(if *b { "1" } else { "0" }),
            Value::Int(i) => {
                let mut buf = itoa::Buffer::new();
                out.push_str(buf.format(*i));
            }
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    let mut buf = itoa::Buffer::new();
                    out.push_str(buf.format(*f as i64));
                } else {
                    let mut buf = ryu::Buffer::new();
                    out.push_str(buf.format(*f));
                }
            }
            Value::Str(s) => out.push_str(s),
            Value::List(items) => {
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.append_to(out);
                }
            }
            Value::Object(o) => out.push_str(o.borrow().vtable().name()),
            Value::Timer(t) => {
                out.push_str("timer ");
                out.push_str(t.key.as_str());
            }
        }
    }

    pub fn display_string(&self) -> String {
        let mut out = String::new();
        self.append_to(&mut out);
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}f", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Object(o) => write!(f, "<{}>", o.borrow().vtable().name()),
            Value::Timer(t) => write!(f, "<timer {}>", t.key.as_str()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Timer(a), Value::Timer(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_convert() {
        assert_eq!(Value::str(" 2.5 ").to_f64(), Some(2.5));
        assert_eq!(Value::Int(5).to_f64(), Some(5.0));
        assert_eq!(Value::Null.to_f64(), None);
        assert_eq!(Value::Bool(true).to_f64(), None);
    }

    #[test]
    fn display_renders_whole_floats_as_ints() {
        assert_eq!(Value::Float(5.0).display_string(), "5");
        assert_eq!(Value::Float(2.5).display_string(), "2.5");
        assert_eq!(Value::Int(-3).display_string(), "-3");
        assert_eq!(Value::Null.display_string(), "");
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::Float(2.5));
    }
}
