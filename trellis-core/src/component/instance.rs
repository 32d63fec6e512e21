//! Component instances.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use super::behavior::Behavior;
use crate::error::{GraphError, GraphResult};
use crate::flag::SharedFlag;
use crate::ids::{ComponentId, GraphId, NodeId, TrackerId};
use crate::property::{Direction, Property, PropertyGroup};
use crate::types::{ComponentDescriptor, Hooks, Singleton};

/// A typed unit of behavior attached to exactly one node.
///
/// Components live in the system's arena and are addressed by id. The node
/// and graph they belong to never change.
pub struct Component {
    id: ComponentId,
    node: NodeId,
    graph: GraphId,
    descriptor: Arc<ComponentDescriptor>,
    name: String,
    pub(crate) tags: IndexSet<String>,
    ins: PropertyGroup,
    outs: PropertyGroup,
    changed: SharedFlag,
    pub(crate) updated: bool,
    pub(crate) trackers: Vec<TrackerId>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        node: NodeId,
        graph: GraphId,
        descriptor: Arc<ComponentDescriptor>,
        ins: PropertyGroup,
        outs: PropertyGroup,
        changed: SharedFlag,
        behavior: Box<dyn Behavior>,
    ) -> Self {
        Self {
            id,
            node,
            graph,
            descriptor,
            name: String::new(),
            tags: IndexSet::new(),
            ins,
            outs,
            changed,
            updated: false,
            trackers: Vec::new(),
            behavior: Some(behavior),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// Whether this component's type is `type_name` or derives from it.
    pub fn is(&self, type_name: &str) -> bool {
        self.descriptor.is(type_name)
    }

    pub fn hooks(&self) -> Hooks {
        self.descriptor.hooks
    }

    pub fn singleton(&self) -> Singleton {
        self.descriptor.singleton
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The name, or the type name when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.descriptor.name
        } else {
            &self.name
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn ins(&self) -> &PropertyGroup {
        &self.ins
    }

    pub fn outs(&self) -> &PropertyGroup {
        &self.outs
    }

    /// Look up a property by path, `ins.key` or `outs.key`.
    pub fn property(&self, path: &str) -> GraphResult<&Property> {
        let (group, key) = path
            .split_once('.')
            .ok_or_else(|| GraphError::PropertyNotFound(path.to_string()))?;
        match Direction::from_group_name(group) {
            Some(Direction::Input) => self.ins.property(key),
            Some(Direction::Output) => self.outs.property(key),
            None => Err(GraphError::PropertyNotFound(path.to_string())),
        }
    }

    /// Whether an input changed since the component last ran.
    pub fn is_changed(&self) -> bool {
        self.changed.get()
    }

    /// Request an update on the next tick.
    pub fn set_changed(&self) {
        self.changed.set();
    }

    pub(crate) fn reset_changed(&self) {
        self.changed.clear();
        self.ins.reset_changed();
        self.outs.reset_changed();
    }

    /// Whether the component reported an update during the last tick.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Trackers owned by this component.
    pub fn trackers(&self) -> &[TrackerId] {
        &self.trackers
    }

    /// The behavior, if it is of type `T`.
    pub fn behavior<T: Behavior>(&self) -> Option<&T> {
        self.behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("type", &self.descriptor.name)
            .field("name", &self.name)
            .field("node", &self.node)
            .field("changed", &self.changed.get())
            .finish()
    }
}
