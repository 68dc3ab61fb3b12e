use std::rc::Rc;

use crate::param::ParamType;
use crate::value::Value;
use crate::vtable::{MethodEntry, TypeVtable};

/// The default intrinsic/library surface: static methods resolvable by name
/// from any script, tried after instance members, static members and global
/// functions.
pub fn default_library() -> Rc<TypeVtable> {
    TypeVtable::builder("lib")
        .static_method(
            MethodEntry::fixed("tostr", vec![ParamType::Any], |_, args| {
                Ok(Value::str(args[0].display_string()))
            })
            .returning(ParamType::Str),
        )
        .static_method(
            MethodEntry::fixed("len", vec![ParamType::Any], |_, args| match &args[0] {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
                other => Err(format!("len is not defined for {}", other.type_name())),
            })
            .returning(ParamType::Int),
        )
        .static_method(
            MethodEntry::trailing("list", vec![], ParamType::Any, |_, args| {
                Ok(args.first().cloned().unwrap_or_else(|| Value::list(Vec::new())))
            })
            .returning(ParamType::List),
        )
        .static_method(
            MethodEntry::trailing("concat", vec![], ParamType::Any, |_, args| {
                let mut out = String::new();
                if let Some(Value::List(items)) = args.first() {
                    for item in items.borrow().iter() {
                        item.append_to(&mut out);
                    }
                }
                Ok(Value::str(out))
            })
            .returning(ParamType::Str),
        )
        .static_method(
            MethodEntry::fixed("matches", vec![ParamType::Str, ParamType::Str], |_, args| {
                let text = args[0].as_str().unwrap_or("");
                let pattern = args[1].as_str().unwrap_or("");
                let re = regex::Regex::new(pattern).map_err(|e| e.to_string())?;
                Ok(Value::Bool(re.is_match(text)))
            })
            .returning(ParamType::Bool),
        )
        .static_method(
            MethodEntry::fixed("min", vec![ParamType::Num, ParamType::Num], |_, args| {
                num_pick(&args[0], &args[1], true)
            })
            .returning(ParamType::Num),
        )
        .static_method(
            MethodEntry::fixed("max", vec![ParamType::Num, ParamType::Num], |_, args| {
                num_pick(&args[0], &args[1], false)
            })
            .returning(ParamType::Num),
        )
        .build()
}

fn num_pick(a: &Value, b: &Value, smaller: bool) -> Result<Value, String> {
    let (x, y) = match (a.to_f64(), b.to_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err("expected two numbers".to_string()),
    };
    let pick_a = if smaller { x <= y } else { x >= y };
    Ok(if pick_a { a.clone() } else { b.clone() })
}
