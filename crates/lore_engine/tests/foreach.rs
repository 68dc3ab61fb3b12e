mod common;

use common::*;
use lore_core::{MethodEntry, ParamType, TypeVtable, Value};
use lore_engine::{Engine, ScriptArgs, ScriptErrorKind, ScriptHolder, ScriptVars};

use std::rc::Rc;

fn herd_vtable(log: Log) -> Rc<TypeVtable> {
    let source_log = log.clone();
    let collect_log = log.clone();
    TypeVtable::builder("npc")
        .instance(MethodEntry::fixed("herd", vec![], move |_, _| {
            source_log.borrow_mut().push("herd".into());
            Ok(Value::list(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ]))
        }))
        .instance(MethodEntry::fixed(
            "collect",
            vec![ParamType::Any],
            move |_, args| {
                collect_log.borrow_mut().push(format!("collect {}", args[0]));
                Ok(args[0].clone())
            },
        ))
        .build()
}

#[test]
fn source_is_evaluated_once_per_loop_entry_not_per_element() {
    let log = new_log();
    let (npc, _) = npc_value(herd_vtable(log.clone()));
    let engine = Engine::new();

    let code = foreach(
        "x",
        call_noargs("herd"),
        vec![call("collect", vec![ident("x")])],
    );
    let holder = ScriptHolder::compile("t", "herd.lore", 1, &code).unwrap();

    holder.run(&engine, npc.clone(), ScriptArgs::default()).unwrap();
    holder.run(&engine, npc, ScriptArgs::default()).unwrap();

    let entries = log_entries(&log);
    let source_evals = entries.iter().filter(|e| *e == "herd").count();
    assert_eq!(source_evals, 2);
    assert_eq!(
        entries,
        vec![
            "herd",
            "collect 1",
            "collect 2",
            "collect 3",
            "herd",
            "collect 1",
            "collect 2",
            "collect 3",
        ]
    );
}

#[test]
fn loop_value_is_the_last_body_value() {
    let log = new_log();
    let (npc, _) = npc_value(herd_vtable(log));
    let engine = Engine::new();

    let code = foreach(
        "x",
        call_noargs("herd"),
        vec![call("collect", vec![ident("x")])],
    );
    let holder = ScriptHolder::compile("t", "herd.lore", 1, &code).unwrap();
    let mut vars = ScriptVars::new(&engine, npc, holder.locals_count(), ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Int(3));
}

#[test]
fn returned_flag_stops_the_loop() {
    let log = new_log();
    let (npc, _) = npc_value(herd_vtable(log.clone()));
    let engine = Engine::new();

    let code = foreach("x", call_noargs("herd"), vec![
        call("collect", vec![ident("x")]),
        ret(Some(ident("x"))),
    ]);
    let holder = ScriptHolder::compile("t", "herd.lore", 1, &code).unwrap();
    let result = holder.run(&engine, npc, ScriptArgs::default()).unwrap();

    assert_eq!(result, Value::Int(1));
    let entries = log_entries(&log);
    assert_eq!(entries, vec!["herd", "collect 1"]);
}

#[test]
fn an_empty_body_is_a_no_op() {
    let log = new_log();
    let (npc, _) = npc_value(herd_vtable(log.clone()));
    let engine = Engine::new();

    let code = foreach("x", call_noargs("herd"), vec![]);
    let holder = ScriptHolder::compile("t", "herd.lore", 1, &code).unwrap();
    let mut vars = ScriptVars::new(&engine, npc, holder.locals_count(), ScriptArgs::default());
    assert_eq!(holder.run_with(&mut vars).unwrap(), Value::Null);
    // The source side effects still happen once per entry.
    assert_eq!(log_entries(&log), vec!["herd"]);
}

#[test]
fn non_iterable_source_raises_a_typed_error() {
    let (npc, _) = npc_value(TypeVtable::builder("npc").build());
    let engine = Engine::new();

    let code = foreach("x", int(9), vec![]);
    let holder = ScriptHolder::compile("t", "herd.lore", 1, &code).unwrap();
    let err = holder.run(&engine, npc, ScriptArgs::default()).unwrap_err();
    match err.kind {
        ScriptErrorKind::NonIterableSource { source, actual } => {
            assert_eq!(source, "9");
            assert_eq!(actual, "int");
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
}
