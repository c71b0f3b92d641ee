//! End-to-end flows: options in, rendered surface out.

use std::rc::Rc;

use weft::{
    DropReason, Engine, EngineError, EngineOptions, KeyPath, MemoryHost, RecordingSink, Value,
    WritePolicy,
};

fn profile() -> Value {
    Value::from_pairs([
        ("name", Value::from("mog")),
        (
            "address",
            Value::from_pairs([
                ("country", Value::from("China")),
                ("city", Value::from("Shenzhen")),
                (
                    "street",
                    Value::from_pairs([("num", Value::from(7)), ("block", Value::from(23))]),
                ),
            ]),
        ),
    ])
}

const CARD: &str = "{{name}} | {{address.city}}, {{address.country}} | No.{{address.street.num}}-{{address.street.block}}";

fn card_engine(host: &mut MemoryHost, policy: WritePolicy) -> Engine {
    host.insert("card");
    let options = EngineOptions::new(CARD, "card", profile()).with_policy(policy);
    Engine::new(options, host).unwrap()
}

#[test]
fn initial_render_fills_the_surface() {
    let mut host = MemoryHost::new();
    let engine = card_engine(&mut host, WritePolicy::FirstWriteOnly);

    assert_eq!(
        host.content("card").as_deref(),
        Some("mog | Shenzhen, China | No.7-23")
    );
    assert_eq!(engine.render_count(), 1);
}

#[test]
fn first_write_only_admits_one_write_per_mutation() {
    let mut host = MemoryHost::new();
    host.insert("app");
    let data = Value::from_pairs([("x", 0), ("y", 0)]);
    let options = EngineOptions::new("x={{x}} y={{y}}", "app", data);
    let mut engine = Engine::new(options, &mut host).unwrap();

    let outcome = engine.set_data(|d| {
        d.set("x", 1);
        d.set("y", 2);
    });

    assert_eq!(outcome.applied, vec![KeyPath::parse("x")]);
    assert_eq!(outcome.dropped[0].reason, DropReason::GateClosed);
    assert_eq!(host.content("app").as_deref(), Some("x=1 y=0"));
    assert_eq!(engine.render_count(), 2, "initial render plus one mutation");
}

#[test]
fn batch_all_lands_every_write_with_one_render() {
    let mut host = MemoryHost::new();
    let mut engine = card_engine(&mut host, WritePolicy::BatchAll);

    let outcome = engine.set_data(|d| {
        d.set("name", "weft");
        d.set("address.city", "Nanjing");
        d.set("address.street.num", 9);
    });

    assert!(outcome.is_clean());
    assert_eq!(outcome.applied.len(), 3);
    assert_eq!(
        host.content("card").as_deref(),
        Some("weft | Nanjing, China | No.9-23")
    );
    assert_eq!(engine.render_count(), 2);
}

#[test]
fn each_admitted_mutation_renders_once() {
    let mut host = MemoryHost::new();
    let mut engine = card_engine(&mut host, WritePolicy::FirstWriteOnly);

    for (pass, city) in ["Beijing", "Wuhan", "Chengdu"].into_iter().enumerate() {
        let outcome = engine.set_data(|d| d.set("address.city", city));
        assert!(outcome.rendered);
        assert_eq!(engine.render_count(), pass as u64 + 2);
        assert!(host.content("card").unwrap().contains(city));
    }
}

#[test]
fn renders_are_full_rewrites() {
    let mut host = MemoryHost::new();
    host.insert("app");
    let options = EngineOptions::new(
        "{{title}}",
        "app",
        Value::from_pairs([("title", "a rather long headline")]),
    );
    let mut engine = Engine::new(options, &mut host).unwrap();

    let outcome = engine.set_data(|d| d.set("title", "short"));
    assert!(outcome.rendered);
    assert_eq!(
        host.content("app").as_deref(),
        Some("short"),
        "no residue from the longer previous content"
    );
}

#[test]
fn output_observable_notifies_on_each_new_render() {
    use std::cell::RefCell;

    let mut host = MemoryHost::new();
    let mut engine = card_engine(&mut host, WritePolicy::FirstWriteOnly);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let output = engine.output();
    let sink = Rc::clone(&seen);
    let subscription = output.subscribe(move |text: &String| sink.borrow_mut().push(text.clone()));

    let first = engine.set_data(|d| d.set("name", "weft"));
    let second = engine.set_data(|d| d.set("name", "warp"));
    assert!(first.rendered && second.rendered);
    assert_eq!(seen.borrow().len(), 2);
    assert!(seen.borrow()[1].starts_with("warp |"));

    drop(subscription);
    let third = engine.set_data(|d| d.set("name", "back"));
    assert!(third.rendered);
    assert_eq!(seen.borrow().len(), 2, "dropped subscriber stays quiet");
}

#[test]
fn unresolved_markers_degrade_then_recover() {
    let mut host = MemoryHost::new();
    host.insert("app");
    let options = EngineOptions::new(
        "{{name}} ({{alias}})",
        "app",
        Value::from_pairs([("name", "mog")]),
    );
    let mut engine = Engine::new(options, &mut host).unwrap();
    assert_eq!(host.content("app").as_deref(), Some("mog ({{alias}})"));

    let outcome = engine.set_data(|d| d.set("alias", "the cat"));
    assert!(outcome.rendered);
    assert_eq!(host.content("app").as_deref(), Some("mog (the cat)"));
}

#[test]
fn scoped_mutations_render_like_any_other() {
    let mut host = MemoryHost::new();
    let mut engine = card_engine(&mut host, WritePolicy::FirstWriteOnly);

    let outcome = engine
        .set_data_at("address.street", |d| d.set("block", 42))
        .unwrap();

    assert_eq!(
        outcome.applied,
        vec![KeyPath::parse("address.street.block")],
        "outcome paths are absolute even under a scoped gate"
    );
    assert!(host.content("card").unwrap().ends_with("No.7-42"));
}

#[test]
fn bad_scope_target_reports_without_rendering() {
    let mut host = MemoryHost::new();
    let mut engine = card_engine(&mut host, WritePolicy::FirstWriteOnly);
    let renders_before = engine.render_count();

    let err = engine.set_data_at("name", |d| d.set("x", 1)).unwrap_err();
    assert!(matches!(err, EngineError::BadMutationTarget { .. }));
    assert_eq!(engine.render_count(), renders_before);
}

#[test]
fn change_events_trace_the_whole_flow() {
    let sink = RecordingSink::new();
    let mut host = MemoryHost::new();
    host.insert("app");
    let data = Value::from_pairs([(
        "street",
        Value::from_pairs([("num", Value::from(7))]),
    )]);
    let options = EngineOptions::new("No.{{street.num}}", "app", data)
        .with_sink(Rc::new(sink.clone()));
    let mut engine = Engine::new(options, &mut host).unwrap();

    // Initial render resolved the marker through the observed tree.
    assert_eq!(
        sink.reads(),
        vec![KeyPath::parse("street"), KeyPath::parse("street.num")]
    );
    sink.clear();

    let outcome = engine.set_data(|d| d.set("street.num", 9));
    assert!(outcome.is_clean());

    // Parent read, the admitted write, then the render pass's reads.
    let events: Vec<String> = sink.events().iter().map(ToString::to_string).collect();
    assert_eq!(
        events,
        vec![
            "read street",
            "write street.num",
            "read street",
            "read street.num",
        ]
    );
    assert_eq!(host.content("app").as_deref(), Some("No.9"));
}
