//! Context handed to behavior hooks.

use super::reference::ComponentReference;
use super::tracker::{ComponentTracker, TrackerScope};
use crate::error::GraphResult;
use crate::ids::{ComponentId, GraphId, NodeId, TrackerId};
use crate::property::PropertyGroup;
use crate::pulse::UpdateContext;
use crate::system::System;

/// Access to the system and to the component a hook is running for.
///
/// `ins` and `outs` are handles to the component's own property groups, so
/// hooks can read and write them while holding `system` mutably.
pub struct ComponentContext<'a> {
    pub system: &'a mut System,
    pub id: ComponentId,
    pub node: NodeId,
    pub graph: GraphId,
    pub ins: PropertyGroup,
    pub outs: PropertyGroup,
    /// Frame timing. Default outside of `tick` and `tock`.
    pub frame: UpdateContext,
}

impl ComponentContext<'_> {
    /// Track components of `type_name` on this component's node.
    ///
    /// The tracker is disposed together with the component.
    pub fn track_component(&mut self, type_name: &str) -> TrackerId {
        self.track(ComponentTracker::new(TrackerScope::Node(self.node), type_name))
    }

    /// Register a tracker owned by this component.
    pub fn track(&mut self, tracker: ComponentTracker) -> TrackerId {
        let id = self.system.track_components(tracker.owned_by(self.id));
        if let Some(component) = self.system.components.get_mut(&self.id) {
            component.trackers.push(id);
        }
        id
    }

    /// A reference to a component of `type_name`, resolved through the
    /// system registry.
    pub fn reference_component(&self, type_name: Option<&'static str>) -> ComponentReference {
        ComponentReference::new(type_name)
    }

    /// Request another update of this component on the next tick.
    pub fn set_changed(&self) -> GraphResult<()> {
        self.system.component(self.id)?.set_changed();
        Ok(())
    }
}
