//! Scheduling Tests
//!
//! These tests verify evaluation order, change propagation and the
//! activate/tick/tock cycle of graphs.

mod common;

use common::{calls_of, chain, node, record, system, take_journal, Lifecycle, Relay};
use trellis_core::{
    Behavior, ComponentContext, ComponentKind, GraphError, GraphResult, Hooks, PropertyGroup,
    PropertySchema, Pulse, Singleton, SystemEvent, UpdateContext,
};

/// Test that a write to a linked output reaches the input without running
/// any component logic.
#[test]
fn change_propagates_without_update() {
    let mut system = system();
    let n = node(&mut system, "n");
    let a = system.create_component_of::<Relay>(n).unwrap();
    let b = system.create_component_of::<Relay>(n).unwrap();
    chain(&system, a, b);
    take_journal();

    system.component(b).unwrap().ins().reset_changed();
    system.property(a, "outs.output").unwrap().set_value(5.0).unwrap();

    let input = system.property(b, "ins.input").unwrap();
    assert_eq!(input.number(), 5.0);
    assert!(input.is_changed());
    assert!(system.component(b).unwrap().is_changed());
    assert!(take_journal().is_empty());
}

/// Test that a downstream component sees the upstream output written in the
/// same tick, even when it was created first.
#[test]
fn single_pass_consistency() {
    let mut system = system();
    let n = node(&mut system, "n");
    let downstream = system.create_component_of::<Relay>(n).unwrap();
    let upstream = system.create_component_of::<Relay>(n).unwrap();
    chain(&system, upstream, downstream);

    system.activate().unwrap();
    system.property(upstream, "ins.input").unwrap().set_value(10.0).unwrap();
    let updated = system.tick(&UpdateContext::default()).unwrap();
    assert!(updated);

    assert_eq!(system.behavior::<Relay>(upstream).unwrap().seen, vec![10.0]);
    assert_eq!(system.behavior::<Relay>(downstream).unwrap().seen, vec![11.0]);

    let order = system.graph(system.root()).unwrap().sorted_components().to_vec();
    assert_eq!(order, vec![upstream, downstream]);
}

/// Test that two outputs can feed one input and both run before it.
#[test]
fn fan_in_orders_every_source_first() {
    let mut system = system();
    let n = node(&mut system, "n");
    let sink = system.create_component_of::<Relay>(n).unwrap();
    let first = system.create_component_of::<Relay>(n).unwrap();
    let second = system.create_component_of::<Relay>(n).unwrap();
    chain(&system, first, sink);
    chain(&system, second, sink);
    assert_eq!(system.property(sink, "ins.input").unwrap().incoming().len(), 2);

    system.activate().unwrap();
    system.property(first, "ins.input").unwrap().set_value(1.0).unwrap();
    system.property(second, "ins.input").unwrap().set_value(5.0).unwrap();
    system.tick(&UpdateContext::default()).unwrap();

    let order = system.graph(system.root()).unwrap().sorted_components().to_vec();
    assert_eq!(order, vec![first, second, sink]);
    assert_eq!(system.behavior::<Relay>(sink).unwrap().seen, vec![6.0]);

    let err = system.link(first, "outs.output", sink, "ins.input").unwrap_err();
    assert!(matches!(err, GraphError::DuplicateLink(_)));
}

/// Test that unchanged components don't update on later ticks.
#[test]
fn update_runs_only_when_changed() {
    let mut system = system();
    let n = node(&mut system, "n");
    let relay = system.create_component_of::<Relay>(n).unwrap();
    system.activate().unwrap();

    let frame = UpdateContext::default();
    assert!(system.tick(&frame).unwrap());
    assert!(!system.tick(&frame).unwrap());
    assert!(!system.component(relay).unwrap().is_updated());

    system.property(relay, "ins.input").unwrap().set_value(2.0).unwrap();
    assert!(system.tick(&frame).unwrap());
    assert!(system.component(relay).unwrap().is_updated());
    assert_eq!(system.behavior::<Relay>(relay).unwrap().seen, vec![0.0, 2.0]);
}

/// Test that tick and tock do nothing while the graph is inactive.
#[test]
fn inactive_graph_is_idle() {
    let mut system = system();
    let n = node(&mut system, "n");
    system.create_component_of::<Lifecycle>(n).unwrap();
    take_journal();

    let frame = UpdateContext::default();
    assert!(!system.tick(&frame).unwrap());
    assert!(!system.tock(&frame).unwrap());
    assert!(take_journal().is_empty());
}

/// Test the hook sequence over a frame.
#[test]
fn hooks_run_in_phase_order() {
    let mut system = system();
    let n = node(&mut system, "n");
    let id = system.create_component_of::<Lifecycle>(n).unwrap();
    system.activate().unwrap();

    let mut pulse = Pulse::new();
    system.run_frame(&pulse.advance(0.1)).unwrap();
    system.run_frame(&pulse.advance(0.1)).unwrap();

    let hooks: Vec<_> = take_journal()
        .into_iter()
        .filter(|(component, _)| *component == id)
        .map(|(_, hook)| hook)
        .collect();
    assert_eq!(
        hooks,
        vec!["create", "activate", "update", "tick", "tock", "tick", "tock"]
    );
}

/// Test that activation is idempotent and follows the sorted order.
#[test]
fn activation_is_idempotent() {
    let mut system = system();
    let n = node(&mut system, "n");
    let a = system.create_component_of::<Lifecycle>(n).unwrap();
    let b = system.create_component_of::<Lifecycle>(n).unwrap();
    take_journal();

    system.activate().unwrap();
    system.activate().unwrap();
    assert_eq!(calls_of(&take_journal(), "activate"), vec![a, b]);

    system.deactivate().unwrap();
    system.deactivate().unwrap();
    assert_eq!(calls_of(&take_journal(), "deactivate"), vec![a, b]);
    assert!(!system.is_active());
}

/// Test that a component created in an active graph is activated at once.
#[test]
fn late_components_are_activated() {
    let mut system = system();
    let n = node(&mut system, "n");
    system.activate().unwrap();
    take_journal();

    let id = system.create_component_of::<Lifecycle>(n).unwrap();
    assert_eq!(take_journal(), vec![(id, "create"), (id, "activate")]);
}

/// Test that linking marks the graph for a resort and that the resort
/// happens lazily.
#[test]
fn links_request_a_resort() {
    let mut system = system();
    let n = node(&mut system, "n");
    let a = system.create_component_of::<Relay>(n).unwrap();
    let b = system.create_component_of::<Relay>(n).unwrap();
    system.activate().unwrap();
    assert!(!system.graph(system.root()).unwrap().is_sort_requested());

    chain(&system, b, a);
    assert!(system.graph(system.root()).unwrap().is_sort_requested());
    assert_eq!(system.graph(system.root()).unwrap().sorted_components(), &[a, b]);

    system.tick(&UpdateContext::default()).unwrap();
    let graph = system.graph(system.root()).unwrap();
    assert!(!graph.is_sort_requested());
    assert_eq!(graph.sorted_components(), &[b, a]);
}

/// Test that a cycle still yields a full order and both sides keep running.
#[test]
fn cycles_do_not_stall_the_schedule() {
    let mut system = system();
    let n = node(&mut system, "n");
    let a = system.create_component_of::<Relay>(n).unwrap();
    let b = system.create_component_of::<Relay>(n).unwrap();
    chain(&system, a, b);
    chain(&system, b, a);

    system.activate().unwrap();
    let graph = system.graph(system.root()).unwrap();
    assert_eq!(graph.sorted_components(), &[a, b]);
    assert_eq!(graph.broken_cycles(), &[a]);

    system.tick(&UpdateContext::default()).unwrap();
    assert_eq!(system.behavior::<Relay>(a).unwrap().seen.len(), 1);
    assert_eq!(system.behavior::<Relay>(b).unwrap().seen.len(), 1);
}

/// Test that update notifications are emitted per updated component.
#[test]
fn updates_are_announced() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut system = system();
    let n = node(&mut system, "n");
    let relay = system.create_component_of::<Relay>(n).unwrap();
    let quiet = system.create_component_of::<Lifecycle>(n).unwrap();

    let updated = Rc::new(RefCell::new(Vec::new()));
    let sink = updated.clone();
    system.subscribe(move |event| {
        if let SystemEvent::ComponentUpdated { id } = event {
            sink.borrow_mut().push(*id);
        }
    });

    system.activate().unwrap();
    system.tick(&UpdateContext::default()).unwrap();
    assert_eq!(*updated.borrow(), vec![relay]);
    assert!(!updated.borrow().contains(&quiet));
}

#[derive(Debug, Default)]
struct Faulty;

impl Behavior for Faulty {
    fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        record(cx.id, "update");
        cx.ins.set_value("level", "not a number")?;
        Ok(true)
    }
}

impl ComponentKind for Faulty {
    const TYPE_NAME: &'static str = "Faulty";
    const SINGLETON: Singleton = Singleton::None;
    const HOOKS: Hooks = Hooks::UPDATE;

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("level", PropertySchema::number(0.0))?;
        Ok(())
    }
}

/// Test that a failing hook aborts the pass and reaches the caller.
#[test]
fn hook_errors_abort_the_tick() {
    let mut system = system();
    let n = node(&mut system, "n");
    let faulty = system.create_component_of::<Faulty>(n).unwrap();
    let after = system.create_component_of::<Lifecycle>(n).unwrap();
    system.activate().unwrap();
    take_journal();

    let err = system.tick(&UpdateContext::default()).unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));

    let journal = take_journal();
    assert_eq!(calls_of(&journal, "update"), vec![faulty]);
    assert!(!journal.iter().any(|(id, _)| *id == after));
}

/// Test that element links carry single vector components.
#[test]
fn vector_elements_link_between_components() {
    let mut system = system();
    let a = node(&mut system, "a");
    let b = node(&mut system, "b");
    let source = system.create_component(a, "Transform").unwrap();
    let target = system.create_component(b, "Transform").unwrap();

    system
        .link_indexed(source, "outs.position", target, "ins.position", Some(1), Some(2))
        .unwrap();
    system
        .property(source, "outs.position")
        .unwrap()
        .set_value([1.0, 2.0, 3.0])
        .unwrap();

    let position = system.property(target, "ins.position").unwrap().vector();
    assert_eq!(position.as_slice(), &[0.0, 0.0, 2.0]);
}
