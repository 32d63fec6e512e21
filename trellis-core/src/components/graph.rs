//! The nested graph component.

use serde::Deserialize;

use crate::component::{Behavior, ComponentContext};
use crate::error::{GraphError, GraphResult};
use crate::ids::GraphId;
use crate::property::{PropertyGroup, PropertySchema};
use crate::serialization::GraphDocument;
use crate::system::System;
use crate::types::{ComponentKind, Hooks};

/// Owns an inner graph and runs it as part of its own graph's schedule.
///
/// The `active` input switches the inner graph on and off. `tick` and
/// `tock` are forwarded into the inner graph, which keeps its own
/// evaluation order.
#[derive(Debug, Default)]
pub struct GraphComponent {
    inner: Option<GraphId>,
}

impl GraphComponent {
    /// The inner graph, once created.
    pub fn inner(&self) -> Option<GraphId> {
        self.inner
    }

    fn inner_graph(&self) -> GraphResult<GraphId> {
        self.inner
            .ok_or_else(|| GraphError::InvalidDocument("graph component has no inner graph".into()))
    }
}

impl ComponentKind for GraphComponent {
    const TYPE_NAME: &'static str = "Graph";
    const HOOKS: Hooks = Hooks::ACTIVATE
        .union(Hooks::DEACTIVATE)
        .union(Hooks::UPDATE)
        .union(Hooks::TICK)
        .union(Hooks::TOCK);

    fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
        ins.add("active", PropertySchema::boolean(true).with_label("Active"))?;
        Ok(())
    }
}

impl Behavior for GraphComponent {
    fn create(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        self.inner = Some(cx.system.create_graph(Some(cx.id))?);
        Ok(())
    }

    fn activate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        if cx.ins.property("active")?.boolean() {
            cx.system.activate_graph(self.inner_graph()?)?;
        }
        Ok(())
    }

    fn deactivate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        cx.system.deactivate_graph(self.inner_graph()?)
    }

    fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        let active = cx.ins.property("active")?;
        if active.is_changed() {
            let inner = self.inner_graph()?;
            if active.boolean() {
                cx.system.activate_graph(inner)?;
            } else {
                cx.system.deactivate_graph(inner)?;
            }
        }
        Ok(false)
    }

    fn tick(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        let frame = cx.frame;
        cx.system.tick_graph(self.inner_graph()?, &frame)
    }

    fn tock(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        let frame = cx.frame;
        cx.system.tock_graph(self.inner_graph()?, &frame)
    }

    fn dispose(&mut self, cx: &mut ComponentContext<'_>) {
        if let Some(inner) = self.inner.take() {
            cx.system.dispose_graph(inner);
        }
    }

    fn save(&self, system: &System) -> GraphResult<Option<serde_json::Value>> {
        let document = system.graph_to_document(self.inner_graph()?)?;
        let mut data = serde_json::Map::new();
        data.insert("graph".to_string(), serde_json::to_value(document)?);
        Ok(Some(serde_json::Value::Object(data)))
    }

    fn load(&mut self, data: &serde_json::Value, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        let Some(graph) = data.get("graph") else {
            return Ok(());
        };
        let document = GraphDocument::deserialize(graph)?;
        cx.system.graph_nodes_from_document(self.inner_graph()?, &document)
    }
}
