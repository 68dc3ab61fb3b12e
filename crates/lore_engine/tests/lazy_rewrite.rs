mod common;

use common::*;
use lore_core::{MethodEntry, ParamType, TypeVtable, Value};
use lore_engine::{Engine, ScriptArgs, ScriptErrorKind, ScriptHolder, ScriptVars};

#[test]
fn eval_of_a_constant_collapses_at_compile_time() {
    let engine = Engine::new();
    let holder = ScriptHolder::compile("t", "eval.lore", 1, &eval(int(4))).unwrap();

    // The wrapper never made it into the tree.
    assert_eq!(holder.describe(), "Const(4)");

    let mut vars = ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Int(4));
    assert_eq!(engine.resolutions(), 0);
}

#[test]
fn eval_of_a_non_constant_keeps_the_wrapper() {
    let holder =
        ScriptHolder::compile("t", "eval.lore", 1, &eval(call_noargs("len"))).unwrap();
    assert!(holder.describe().starts_with("Eval(Lazy"));
}

#[test]
fn an_unresolvable_bare_word_collapses_to_its_text() {
    let engine = Engine::new();
    let holder = ScriptHolder::compile("t", "word.lore", 1, &ident("northwind")).unwrap();

    let mut vars = ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::str("northwind"));
    assert_eq!(holder.describe(), "Const(\"northwind\")");

    // A strict call of the same unknown name is an error instead.
    let strict =
        ScriptHolder::compile("t", "word.lore", 1, &call("northwind", vec![int(1)])).unwrap();
    let mut vars = ScriptVars::new(&engine, Value::Null, 0, ScriptArgs::default());
    let err = strict.run_with(&mut vars).unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::UndefinedIdentifier(_)));
}

#[test]
fn local_references_specialize_to_slot_access() {
    let engine = Engine::new();
    let code = script(vec![
        assign("x", int(11)),
        ret(Some(ident("x"))),
    ]);
    let holder = ScriptHolder::compile("t", "locals.lore", 1, &code).unwrap();
    assert_eq!(holder.locals_count(), 1);

    let result = holder.run(&engine, Value::Null, ScriptArgs::default()).unwrap();
    assert_eq!(result, Value::Int(11));

    // Slots are fixed at compile time; the read specialized away from the
    // name lookup after its first run.
    holder.run(&engine, Value::Null, ScriptArgs::default()).unwrap();
    assert_eq!(engine.resolutions(), 1);
}

#[test]
fn text_shape_calls_fold_arguments_through_the_template() {
    let captured = new_log();
    let captured2 = captured.clone();
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::text("shout", move |_, args| {
            captured2.borrow_mut().push(args[0].display_string());
            Ok(Value::Null)
        }))
        .build();
    let (npc, _) = npc_value(vtable);
    let engine = Engine::new();

    let holder = ScriptHolder::compile(
        "t",
        "shout.lore",
        1,
        &call("shout", vec![int(3), strlit("wolves"), int(7)]),
    )
    .unwrap();
    holder.run(&engine, npc.clone(), ScriptArgs::default()).unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();

    assert_eq!(
        log_entries(&captured),
        vec!["3, wolves, 7", "3, wolves, 7"]
    );
    assert_eq!(holder.describe(), "MethodText(shout)");
}

#[test]
fn single_string_argument_prefers_the_direct_call() {
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::text("shout", |_, _| Ok(Value::Null)))
        .build();
    let (npc, _) = npc_value(vtable);
    let engine = Engine::new();

    let holder = ScriptHolder::compile(
        "t",
        "shout.lore",
        1,
        &call("shout", vec![strlit("wolves")]),
    )
    .unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();
    assert_eq!(holder.describe(), "Method(shout)");
}

#[test]
fn methods_can_mutate_the_acting_object() {
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::fixed(
            "sethp",
            vec![ParamType::Int],
            |target, args| {
                let Value::Object(obj) = target else {
                    return Err("no acting object".to_string());
                };
                let mut obj = obj.borrow_mut();
                let npc = obj
                    .as_any_mut()
                    .downcast_mut::<Npc>()
                    .ok_or("not an npc")?;
                npc.hp = args[0].to_i64().unwrap_or(0);
                Ok(Value::Null)
            },
        ))
        .build();
    let (npc, npc_cell) = npc_value(vtable);
    let engine = Engine::new();

    let holder =
        ScriptHolder::compile("t", "hp.lore", 1, &call("sethp", vec![int(40)])).unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();
    assert_eq!(npc_cell.borrow().hp, 40);
}

#[test]
fn native_failures_are_wrapped_with_position_and_script() {
    let vtable = TypeVtable::builder("npc")
        .instance(MethodEntry::fixed("explode", vec![], |_, _| {
            Err("no fuse".to_string())
        }))
        .build();
    let (npc, _) = npc_value(vtable);
    let engine = Engine::new();

    let holder = ScriptHolder::compile("boom", "mine.lore", 7, &call_noargs("explode"))
        .unwrap()
        .in_group("mine_traps");
    let err = holder.run(&engine, npc, ScriptArgs::default()).unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::NativeFailure { .. }));
    assert_eq!(err.script, "mine_traps: @boom");
    assert_eq!(err.pos.file.as_ref(), "mine.lore");
    assert_eq!(err.pos.line, 8);
}
