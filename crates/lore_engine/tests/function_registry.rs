mod common;

use common::*;
use lore_core::Value;
use lore_engine::{Engine, ScriptArgs, ScriptErrorKind, ScriptHolder, ScriptVars};

use std::rc::Rc;

#[test]
fn function_names_are_case_insensitive_and_unique_while_loaded() {
    let mut engine = Engine::new();
    let first = Rc::new(
        ScriptHolder::compile("Regen", "lib.lore", 1, &script(vec![ret(Some(int(1)))]))
            .unwrap(),
    );
    engine.define_function(first.clone()).unwrap();

    let second = Rc::new(
        ScriptHolder::compile("regen", "lib.lore", 9, &script(vec![ret(Some(int(2)))]))
            .unwrap(),
    );
    let err = engine.define_function(second.clone()).unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::FunctionAlreadyExists(_)));

    // Unloading frees the name for a replacement compilation.
    first.unload();
    engine.define_function(second).unwrap();
    let replaced = engine.function("REGEN").unwrap();
    let result = replaced
        .run(&engine, Value::Null, ScriptArgs::default())
        .unwrap();
    assert_eq!(result, Value::Int(2));
}

#[test]
fn running_an_unloaded_holder_is_an_error() {
    let engine = Engine::new();
    let holder =
        ScriptHolder::compile("tick", "lib.lore", 1, &script(vec![ret(Some(int(1)))])).unwrap();
    holder.unload();
    let err = holder
        .run(&engine, Value::Null, ScriptArgs::default())
        .unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::HolderUnloaded(_)));
}

#[test]
fn functions_receive_rendered_text_and_argument_values() {
    let mut engine = Engine::new();
    // Body returns the first invocation argument.
    let echo = Rc::new(
        ScriptHolder::compile(
            "echo",
            "lib.lore",
            1,
            &script(vec![ret(Some(arg_ref(0)))]),
        )
        .unwrap(),
    );
    engine.define_function(echo).unwrap();

    let holder = ScriptHolder::compile(
        "t",
        "use.lore",
        1,
        &call("echo", vec![int(41), strlit("x")]),
    )
    .unwrap();
    let mut vars = ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Int(41));
}

#[test]
fn a_script_that_falls_off_the_end_yields_null() {
    let engine = Engine::new();
    let holder =
        ScriptHolder::compile("t", "lib.lore", 1, &script(vec![eval(int(9))])).unwrap();
    // Raw value is the last expression...
    let mut vars = ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Int(9));
    // ...but the function entry point only honors an explicit return.
    assert_eq!(
        holder.run(&engine, Value::Null, ScriptArgs::default()).unwrap(),
        Value::Null
    );
}
