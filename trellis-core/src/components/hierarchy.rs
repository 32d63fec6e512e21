//! Parent/child trees between components.

use serde::Deserialize;

use crate::component::{Behavior, ComponentContext};
use crate::error::{GraphError, GraphResult};
use crate::ids::{ComponentId, GraphId};
use crate::system::System;
use crate::types::ComponentKind;

/// A node in a component tree.
///
/// Links are stored as ids and resolved through the system, so a disposed
/// parent or child simply disappears from lookups. Parentless hierarchy
/// components are the roots of their graph.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
}

impl ComponentKind for Hierarchy {
    const TYPE_NAME: &'static str = "Hierarchy";
}

impl Hierarchy {
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    /// Make `child` the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn attach(system: &mut System, parent: ComponentId, child: ComponentId) -> GraphResult<()> {
        let graph = Self::check(system, parent)?;
        if Self::check(system, child)? != graph {
            return Err(GraphError::InvalidHierarchy(format!(
                "{} and {} belong to different graphs",
                parent, child
            )));
        }
        if parent == child || Self::ancestors(system, parent).contains(&child) {
            return Err(GraphError::InvalidHierarchy(format!(
                "attaching {} to {} would create a cycle",
                child, parent
            )));
        }

        Self::detach(system, child)?;
        if let Some(hierarchy) = system.behavior_mut::<Hierarchy>(parent) {
            hierarchy.children.push(child);
        }
        if let Some(hierarchy) = system.behavior_mut::<Hierarchy>(child) {
            hierarchy.parent = Some(parent);
        }
        if let Some(graph) = system.graphs.get_mut(&graph) {
            graph.roots.shift_remove(&child);
        }
        tracing::debug!(parent = %parent, child = %child, "attached hierarchy child");
        Ok(())
    }

    /// Detach `child` from its parent, making it a root again.
    pub fn detach(system: &mut System, child: ComponentId) -> GraphResult<()> {
        let graph = Self::check(system, child)?;
        let Some(parent) = system.behavior::<Hierarchy>(child).and_then(Hierarchy::parent) else {
            return Ok(());
        };

        if let Some(hierarchy) = system.behavior_mut::<Hierarchy>(parent) {
            hierarchy.children.retain(|id| *id != child);
        }
        if let Some(hierarchy) = system.behavior_mut::<Hierarchy>(child) {
            hierarchy.parent = None;
        }
        if let Some(graph) = system.graphs.get_mut(&graph) {
            graph.roots.insert(child);
        }
        Ok(())
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(system: &System, id: ComponentId) -> Vec<ComponentId> {
        let mut ancestors = Vec::new();
        let mut current = system.behavior::<Hierarchy>(id).and_then(Hierarchy::parent);
        while let Some(parent) = current {
            if parent == id || ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = system.behavior::<Hierarchy>(parent).and_then(Hierarchy::parent);
        }
        ancestors
    }

    /// All descendants of `id`, depth first.
    pub fn descendants(system: &System, id: ComponentId) -> Vec<ComponentId> {
        let mut descendants = Vec::new();
        let mut stack: Vec<ComponentId> = system
            .behavior::<Hierarchy>(id)
            .map(|hierarchy| hierarchy.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if next == id || descendants.contains(&next) {
                continue;
            }
            descendants.push(next);
            if let Some(hierarchy) = system.behavior::<Hierarchy>(next) {
                stack.extend(hierarchy.children.iter().rev().copied());
            }
        }
        descendants
    }

    fn check(system: &System, id: ComponentId) -> GraphResult<GraphId> {
        let component = system.component(id)?;
        if system.behavior::<Hierarchy>(id).is_none() {
            return Err(GraphError::IncompatibleReference {
                id,
                expected: Self::TYPE_NAME,
                actual: component.type_name(),
            });
        }
        Ok(component.graph())
    }

    fn unresolved(cx: &ComponentContext<'_>, what: String) -> GraphResult<()> {
        if cx.system.config().strict_references {
            return Err(GraphError::UnresolvedReference(what));
        }
        tracing::warn!(component = %cx.id, reference = %what, "hierarchy child not resolved");
        Ok(())
    }
}

impl Behavior for Hierarchy {
    fn create(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        if let Some(graph) = cx.system.graphs.get_mut(&cx.graph) {
            graph.roots.insert(cx.id);
        }
        Ok(())
    }

    fn dispose(&mut self, cx: &mut ComponentContext<'_>) {
        if let Some(parent) = self.parent.take() {
            if let Some(hierarchy) = cx.system.behavior_mut::<Hierarchy>(parent) {
                hierarchy.children.retain(|id| *id != cx.id);
            }
        }
        for child in std::mem::take(&mut self.children) {
            if let Some(hierarchy) = cx.system.behavior_mut::<Hierarchy>(child) {
                hierarchy.parent = None;
            }
            if let Some(graph) = cx.system.graphs.get_mut(&cx.graph) {
                graph.roots.insert(child);
            }
        }
    }

    fn save(&self, _system: &System) -> GraphResult<Option<serde_json::Value>> {
        if self.children.is_empty() {
            return Ok(None);
        }
        let children = self.children.iter().map(|id| serde_json::Value::String(id.to_string()));
        let mut data = serde_json::Map::new();
        data.insert("children".to_string(), serde_json::Value::Array(children.collect()));
        Ok(Some(serde_json::Value::Object(data)))
    }

    fn resolve_references(&mut self, data: &serde_json::Value, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        let Some(children) = data.get("children").and_then(serde_json::Value::as_array) else {
            return Ok(());
        };

        let mut lineage = Vec::new();
        let mut ancestor = self.parent;
        while let Some(id) = ancestor {
            if lineage.contains(&id) {
                break;
            }
            lineage.push(id);
            ancestor = cx.system.behavior::<Hierarchy>(id).and_then(Hierarchy::parent);
        }

        for value in children {
            let child = ComponentId::deserialize(value)?;
            let resolvable = child != cx.id
                && !lineage.contains(&child)
                && !self.children.contains(&child)
                && cx
                    .system
                    .find_component(child)
                    .is_some_and(|component| component.graph() == cx.graph)
                && cx
                    .system
                    .behavior::<Hierarchy>(child)
                    .is_some_and(|hierarchy| hierarchy.parent.is_none());
            if !resolvable {
                Self::unresolved(cx, format!("child {}", child))?;
                continue;
            }

            if let Some(hierarchy) = cx.system.behavior_mut::<Hierarchy>(child) {
                hierarchy.parent = Some(cx.id);
            }
            if let Some(graph) = cx.system.graphs.get_mut(&cx.graph) {
                graph.roots.shift_remove(&child);
            }
            self.children.push(child);
        }
        Ok(())
    }
}
