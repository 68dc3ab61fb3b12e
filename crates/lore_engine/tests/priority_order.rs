mod common;

use common::*;
use lore_core::{MethodEntry, ParamType, TypeVtable, Value};
use lore_engine::{Engine, ScriptArgs, ScriptErrorKind, ScriptHolder};

use std::rc::Rc;

#[test]
fn instance_name_match_blocks_fallback_to_static() {
    // Both an instance and a static member answer to "heal"; the caller's
    // single argument only fits the static one. The instance member is
    // tried first, its name matches, and that stops the search with a
    // bad-arguments error instead of silently using the static overload.
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::fixed(
            "heal",
            vec![ParamType::Int, ParamType::Int],
            |_, _| Ok(Value::Null),
        ))
        .static_method(MethodEntry::fixed("heal", vec![ParamType::Int], |_, _| {
            Ok(Value::Null)
        }))
        .build();
    let (npc, _) = npc_value(vtable);

    let engine = Engine::new();
    let holder =
        ScriptHolder::compile("t", "heal.lore", 1, &call("heal", vec![int(5)])).unwrap();
    let err = holder
        .run(&engine, npc, ScriptArgs::default())
        .unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::BadArguments(ref name) if name == "heal"));
}

#[test]
fn static_is_tried_when_no_instance_member_has_the_name() {
    let log = new_log();
    let log2 = log.clone();
    let vtable = TypeVtable::builder("npc")
        .static_method(MethodEntry::fixed("heal", vec![ParamType::Int], move |_, args| {
            log2.borrow_mut().push(format!("static heal {}", args[0]));
            Ok(Value::Null)
        }))
        .build();
    let (npc, _) = npc_value(vtable);

    let engine = Engine::new();
    let holder =
        ScriptHolder::compile("t", "heal.lore", 1, &call("heal", vec![int(5)])).unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();
    assert_eq!(log_entries(&log), vec!["static heal 5"]);
}

#[test]
fn static_name_match_does_not_block_the_function_registry() {
    // A static member named "greet" exists but takes two ints. The global
    // function of the same name still wins over the final error.
    let marker = new_log();
    let vtable = TypeVtable::builder("npc")
        .static_method(MethodEntry::fixed(
            "greet",
            vec![ParamType::Int, ParamType::Int],
            |_, _| Ok(Value::Null),
        ))
        .instance(logging_entry("mark", vec![], marker.clone()))
        .build();
    let (npc, _) = npc_value(vtable);

    let mut engine = Engine::new();
    let function = Rc::new(
        ScriptHolder::compile("greet", "lib.lore", 1, &script(vec![call_noargs("mark")]))
            .unwrap(),
    );
    engine.define_function(function).unwrap();

    let holder =
        ScriptHolder::compile("t", "greet.lore", 1, &call("greet", vec![int(1)])).unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();

    // The function body ran on the same acting object.
    assert_eq!(log_entries(&marker), vec!["mark()"]);
}

#[test]
fn functions_are_tried_before_the_intrinsic_library() {
    // "len" exists in the intrinsic library; a global function of the same
    // name shadows it.
    let marker = new_log();
    let marker2 = marker.clone();
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::fixed("mark", vec![], move |_, _| {
            marker2.borrow_mut().push("function len".into());
            Ok(Value::Null)
        }))
        .build();
    let (npc, _) = npc_value(vtable);

    let mut engine = Engine::new();
    let function = Rc::new(
        ScriptHolder::compile("len", "lib.lore", 1, &script(vec![call_noargs("mark")])).unwrap(),
    );
    engine.define_function(function).unwrap();

    let holder = ScriptHolder::compile(
        "t",
        "len.lore",
        1,
        &call("len", vec![strlit("abc")]),
    )
    .unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();
    assert_eq!(log_entries(&marker), vec!["function len"]);
}

#[test]
fn the_intrinsic_library_is_the_last_resort() {
    let engine = Engine::new();
    let holder = ScriptHolder::compile(
        "t",
        "len.lore",
        1,
        &call("len", vec![strlit("abcd")]),
    )
    .unwrap();
    let mut vars =
        lore_engine::ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Int(4));
}

#[test]
fn unknown_names_and_ill_typed_names_report_differently() {
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::fixed("feed", vec![ParamType::Int], |_, _| {
            Ok(Value::Null)
        }))
        .build();
    let (npc, _) = npc_value(vtable.clone());

    let engine = Engine::new();
    let bad = ScriptHolder::compile(
        "t",
        "e.lore",
        1,
        &call("feed", vec![strlit("meat"), strlit("bread")]),
    )
    .unwrap();
    let err = bad.run(&engine, npc, ScriptArgs::default()).unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::BadArguments(_)));

    let (npc, _) = npc_value(vtable);
    let missing =
        ScriptHolder::compile("t", "e.lore", 1, &call("devour", vec![int(1)])).unwrap();
    let err = missing.run(&engine, npc, ScriptArgs::default()).unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::UndefinedIdentifier(_)));
}
