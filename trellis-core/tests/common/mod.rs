//! Component kinds shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use trellis_core::{
    Behavior, ComponentContext, ComponentId, ComponentKind, GraphResult, Hooks, NodeId,
    PropertyGroup, PropertySchema, Singleton, System,
};

thread_local! {
    static JOURNAL: RefCell<Vec<(ComponentId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Record a hook call for the current test thread.
pub fn record(id: ComponentId, hook: &'static str) {
    JOURNAL.with(|journal| journal.borrow_mut().push((id, hook)));
}

/// Drain the hook calls recorded so far.
pub fn take_journal() -> Vec<(ComponentId, &'static str)> {
    JOURNAL.with(|journal| std::mem::take(&mut *journal.borrow_mut()))
}

/// Calls of one hook, in order.
pub fn calls_of(journal: &[(ComponentId, &'static str)], hook: &str) -> Vec<ComponentId> {
    journal
        .iter()
        .filter(|(_, name)| *name == hook)
        .map(|(id, _)| *id)
        .collect()
}

/// Adds one to its input. Records every input value it sees.
#[derive(Debug, Default)]
pub struct Relay {
    pub seen: Vec<f64>,
}

impl Behavior for Relay {
    fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        record(cx.id, "update");
        let input = cx.ins.property("input")?.number();
        self.seen.push(input);
        cx.outs.set_value("output", input + 1.0)?;
        Ok(true)
    }
}

impl ComponentKind for Relay {
    const TYPE_NAME: &'static str = "Relay";
    const SINGLETON: Singleton = Singleton::None;
    const HOOKS: Hooks = Hooks::UPDATE;

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("input", PropertySchema::number(0.0))?;
        Ok(())
    }

    fn declare_outs(outs: &mut PropertyGroup) -> GraphResult<()> {
        outs.add("output", PropertySchema::number(0.0))?;
        Ok(())
    }
}

/// Records every lifecycle hook.
#[derive(Debug, Default)]
pub struct Lifecycle;

impl Behavior for Lifecycle {
    fn create(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        record(cx.id, "create");
        Ok(())
    }

    fn activate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        record(cx.id, "activate");
        Ok(())
    }

    fn deactivate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        record(cx.id, "deactivate");
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        record(cx.id, "update");
        Ok(false)
    }

    fn tick(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        record(cx.id, "tick");
        Ok(false)
    }

    fn tock(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        record(cx.id, "tock");
        Ok(false)
    }

    fn dispose(&mut self, cx: &mut ComponentContext<'_>) {
        record(cx.id, "dispose");
    }
}

impl ComponentKind for Lifecycle {
    const TYPE_NAME: &'static str = "Lifecycle";
    const SINGLETON: Singleton = Singleton::None;
    const HOOKS: Hooks = Hooks::ACTIVATE
        .union(Hooks::DEACTIVATE)
        .union(Hooks::UPDATE)
        .union(Hooks::TICK)
        .union(Hooks::TOCK);

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("level", PropertySchema::number(0.0))?;
        Ok(())
    }
}

/// Node singleton with no hooks.
#[derive(Debug, Default)]
pub struct Transform;

impl Behavior for Transform {}

impl ComponentKind for Transform {
    const TYPE_NAME: &'static str = "Transform";

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("position", PropertySchema::vector(&[0.0, 0.0, 0.0]))?;
        ins.add("visible", PropertySchema::boolean(true))?;
        Ok(())
    }

    fn declare_outs(outs: &mut PropertyGroup) -> GraphResult<()> {
        outs.add("position", PropertySchema::vector(&[0.0, 0.0, 0.0]))?;
        Ok(())
    }
}

/// Graph singleton.
#[derive(Debug, Default)]
pub struct Scene;

impl Behavior for Scene {}

impl ComponentKind for Scene {
    const TYPE_NAME: &'static str = "Scene";
    const SINGLETON: Singleton = Singleton::Graph;
}

/// System singleton.
#[derive(Debug, Default)]
pub struct Settings;

impl Behavior for Settings {}

impl ComponentKind for Settings {
    const TYPE_NAME: &'static str = "Settings";
    const SINGLETON: Singleton = Singleton::System;
}

/// Base of a small type hierarchy.
#[derive(Debug, Default)]
pub struct Light;

impl Behavior for Light {}

impl ComponentKind for Light {
    const TYPE_NAME: &'static str = "Light";
    const SINGLETON: Singleton = Singleton::None;

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("intensity", PropertySchema::number(1.0).with_range(0.0, 10.0))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SpotLight;

impl Behavior for SpotLight {}

impl ComponentKind for SpotLight {
    const TYPE_NAME: &'static str = "SpotLight";
    const PARENT: Option<&'static str> = Some("Light");
    const SINGLETON: Singleton = Singleton::None;

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        Light::declare_ins(ins)?;
        ins.add("angle", PropertySchema::number(45.0))?;
        Ok(())
    }
}

/// Holds free-form JSON.
#[derive(Debug, Default)]
pub struct Note;

impl Behavior for Note {}

impl ComponentKind for Note {
    const TYPE_NAME: &'static str = "Note";
    const SINGLETON: Singleton = Singleton::None;

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("payload", PropertySchema::object(serde_json::json!({})))?;
        ins.add("extra", PropertySchema::object(serde_json::json!({})))?;
        Ok(())
    }
}

/// A system with every test kind registered.
pub fn system() -> System {
    let mut system = System::new();
    system.register_component::<Relay>().unwrap();
    system.register_component::<Lifecycle>().unwrap();
    system.register_component::<Transform>().unwrap();
    system.register_component::<Scene>().unwrap();
    system.register_component::<Settings>().unwrap();
    system.register_component::<Light>().unwrap();
    system.register_component::<SpotLight>().unwrap();
    system.register_component::<Note>().unwrap();
    system
}

/// A plain node in the root graph.
pub fn node(system: &mut System, name: &str) -> NodeId {
    let root = system.root();
    system.create_node(root, "Node", name).unwrap()
}

/// Link `from.outs.output` to `to.ins.input`.
pub fn chain(system: &System, from: ComponentId, to: ComponentId) {
    system.link(from, "outs.output", to, "ins.input").unwrap();
}
