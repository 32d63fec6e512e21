//! Graph scheduling.
//!
//! Each graph evaluates its components once per frame in a cached
//! dependency order:
//!
//! 1. `activate` sorts if a resort is pending, then activates every
//!    component in order
//! 2. `tick` sorts if needed, then walks the order once. Changed components
//!    run `update` and `tick`; unchanged ones only `tick`
//! 3. `tock` runs after all ticks, on the components that asked for it
//!
//! A write to an output is pushed through its links synchronously, so a
//! downstream component sees the new value in the same pass as long as the
//! order is a valid topological order.
//!
//! Errors returned by a hook abort the pass and reach the caller unchanged.

use smallvec::SmallVec;

use super::sorter::LinkableSorter;
use crate::error::GraphResult;
use crate::event::SystemEvent;
use crate::ids::{ComponentId, GraphId};
use crate::pulse::UpdateContext;
use crate::system::System;
use crate::types::Hooks;

impl System {
    /// Recompute the evaluation order of a graph.
    ///
    /// A component depends on the owners of the sources linked into its
    /// inputs, as long as they live in the same graph.
    pub fn sort_graph(&mut self, id: GraphId) -> GraphResult<()> {
        let graph = self.graph(id)?;
        graph.sort_requested.clear();
        let items: Vec<ComponentId> = graph.components().collect();

        let components = &self.components;
        let outcome = LinkableSorter::new().sort(&items, |component| {
            let mut sources: SmallVec<[ComponentId; 4]> = SmallVec::new();
            if let Some(component) = components.get(&component) {
                for property in component.ins().iter() {
                    sources.extend(
                        property
                            .source_owners()
                            .into_iter()
                            .filter(|owner| components.get(owner).is_some_and(|c| c.graph() == id)),
                    );
                }
            }
            sources
        });

        if outcome.has_cycles() && self.config.warn_on_cycles {
            tracing::warn!(
                graph = %id,
                broken = outcome.broken_cycles.len(),
                "dependency cycle in graph, order is not fully topological"
            );
        }
        tracing::debug!(graph = %id, components = outcome.order.len(), "sorted graph");

        let graph = self.graph_mut(id)?;
        graph.sorted = outcome.order.into();
        graph.broken_cycles = outcome.broken_cycles;
        Ok(())
    }

    fn sort_if_requested(&mut self, id: GraphId) -> GraphResult<()> {
        if self.graph(id)?.sort_requested.take() {
            self.sort_graph(id)?;
        }
        Ok(())
    }

    /// Activate a graph and every component in it. Idempotent.
    pub fn activate_graph(&mut self, id: GraphId) -> GraphResult<()> {
        if self.graph(id)?.is_active() {
            return Ok(());
        }
        self.sort_if_requested(id)?;

        let graph = self.graph_mut(id)?;
        graph.active = true;
        let order = graph.sorted.clone();
        self.observers.emit(SystemEvent::GraphActivated(id));
        tracing::debug!(graph = %id, "activated graph");

        for &component in order.iter() {
            if self.has_hook(component, Hooks::ACTIVATE) {
                self.invoke(component, UpdateContext::default(), |behavior, cx| {
                    behavior.activate(cx)
                })?;
            }
        }
        Ok(())
    }

    /// Deactivate every component in the cached order, then the graph.
    /// Idempotent.
    pub fn deactivate_graph(&mut self, id: GraphId) -> GraphResult<()> {
        let graph = self.graph_mut(id)?;
        if !graph.active {
            return Ok(());
        }
        graph.active = false;
        let order = graph.sorted.clone();

        for &component in order.iter() {
            if self.has_hook(component, Hooks::DEACTIVATE) {
                self.invoke(component, UpdateContext::default(), |behavior, cx| {
                    behavior.deactivate(cx)
                })?;
            }
        }

        self.observers.emit(SystemEvent::GraphDeactivated(id));
        tracing::debug!(graph = %id, "deactivated graph");
        Ok(())
    }

    /// Run one evaluation pass. Returns whether any component updated.
    /// No-op while the graph is inactive.
    pub fn tick_graph(&mut self, id: GraphId, frame: &UpdateContext) -> GraphResult<bool> {
        if !self.graph(id)?.is_active() {
            return Ok(false);
        }
        self.sort_if_requested(id)?;

        let order = self.graph(id)?.sorted.clone();
        let mut any_updated = false;

        for &component_id in order.iter() {
            let Some(component) = self.components.get_mut(&component_id) else {
                continue;
            };
            component.updated = false;
            let hooks = component.hooks();
            let mut updated = false;

            if component.is_changed() {
                tracing::trace!(component = %component_id, "updating changed component");
                if hooks.contains(Hooks::UPDATE) {
                    updated |= self
                        .invoke(component_id, *frame, |behavior, cx| behavior.update(cx))?
                        .unwrap_or(false);
                }
                if hooks.contains(Hooks::TICK) {
                    updated |= self
                        .invoke(component_id, *frame, |behavior, cx| behavior.tick(cx))?
                        .unwrap_or(false);
                }
                if let Some(component) = self.components.get(&component_id) {
                    component.reset_changed();
                }
            } else if hooks.contains(Hooks::TICK) {
                updated = self
                    .invoke(component_id, *frame, |behavior, cx| behavior.tick(cx))?
                    .unwrap_or(false);
            }

            if updated {
                if let Some(component) = self.components.get_mut(&component_id) {
                    component.updated = true;
                }
                self.observers.emit(SystemEvent::ComponentUpdated { id: component_id });
                any_updated = true;
            }
        }
        Ok(any_updated)
    }

    /// Run the post pass on every component with a `tock` hook. Returns
    /// whether any of them reported a change. No-op while inactive.
    pub fn tock_graph(&mut self, id: GraphId, frame: &UpdateContext) -> GraphResult<bool> {
        let graph = self.graph(id)?;
        if !graph.is_active() {
            return Ok(false);
        }
        let list: SmallVec<[ComponentId; 8]> = graph.tock_components().collect();

        let mut changed = false;
        for component in list {
            changed |= self
                .invoke(component, *frame, |behavior, cx| behavior.tock(cx))?
                .unwrap_or(false);
        }
        Ok(changed)
    }

    fn has_hook(&self, component: ComponentId, hook: Hooks) -> bool {
        self.components
            .get(&component)
            .is_some_and(|component| component.hooks().contains(hook))
    }
}
