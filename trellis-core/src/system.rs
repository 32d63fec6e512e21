//! The system: root graph, object arenas and global indexes.
//!
//! All nodes and components of all graphs live in arenas owned by the
//! [`System`] and are addressed by id. Per-node and per-graph indexes, and
//! the system-wide type and tag indexes, are updated together by the
//! creation and disposal methods here; nothing else mutates them.

use indexmap::IndexMap;

use crate::component::{Behavior, Component, ComponentContext, ComponentTracker};
use crate::components::{GraphComponent, Hierarchy};
use crate::config::SystemConfig;
use crate::error::{GraphError, GraphResult};
use crate::event::{Observers, SystemEvent};
use crate::flag::SharedFlag;
use crate::graph::Graph;
use crate::ids::{ComponentId, GraphId, NodeId, SubscriptionId, TrackerId};
use crate::node::Node;
use crate::property::{Direction, Owner, Property, PropertyGroup};
use crate::pulse::UpdateContext;
use crate::registry::ObjectRegistry;
use crate::serialization::PendingComponent;
use crate::types::{
    BaseNode, ComponentDescriptor, ComponentKind, Hooks, NodeKind, Singleton, TypeRegistry,
};

/// Root of the runtime.
///
/// ```
/// use trellis_core::{Hierarchy, System};
///
/// let mut system = System::new();
/// let node = system.create_node(system.root(), "Node", "Scene").unwrap();
/// let component = system.create_component(node, "Hierarchy").unwrap();
///
/// assert!(system.behavior::<Hierarchy>(component).is_some());
/// assert_eq!(system.node(node).unwrap().component_count(), 1);
/// ```
#[derive(Debug)]
pub struct System {
    pub(crate) config: SystemConfig,
    types: TypeRegistry,
    pub(crate) graphs: IndexMap<GraphId, Graph>,
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) components: IndexMap<ComponentId, Component>,
    node_index: ObjectRegistry<NodeId>,
    component_index: ObjectRegistry<ComponentId>,
    trackers: IndexMap<TrackerId, ComponentTracker>,
    pub(crate) observers: Observers,
    pub(crate) pending: Vec<PendingComponent>,
    root: GraphId,
}

impl System {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let mut types = TypeRegistry::new();
        types.register_node::<BaseNode>();
        for result in [
            types.register_component::<GraphComponent>(),
            types.register_component::<Hierarchy>(),
        ] {
            if let Err(err) = result {
                tracing::warn!(error = %err, "failed to register built-in component type");
            }
        }

        let root = GraphId::new();
        let mut graphs = IndexMap::new();
        graphs.insert(root, Graph::new(root, None, 0));

        Self {
            config,
            types,
            graphs,
            nodes: IndexMap::new(),
            components: IndexMap::new(),
            node_index: ObjectRegistry::new(),
            component_index: ObjectRegistry::new(),
            trackers: IndexMap::new(),
            observers: Observers::default(),
            pending: Vec::new(),
            root,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn register_component<T: ComponentKind>(&mut self) -> GraphResult<()> {
        self.types.register_component::<T>()
    }

    pub fn register_node<T: NodeKind>(&mut self) {
        self.types.register_node::<T>();
    }

    /// Observe system events until [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SystemEvent) + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // Graphs

    pub fn root(&self) -> GraphId {
        self.root
    }

    pub fn graph(&self, id: GraphId) -> GraphResult<&Graph> {
        self.graphs.get(&id).ok_or(GraphError::GraphNotFound(id))
    }

    pub fn find_graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.get(&id)
    }

    pub(crate) fn graph_mut(&mut self, id: GraphId) -> GraphResult<&mut Graph> {
        self.graphs.get_mut(&id).ok_or(GraphError::GraphNotFound(id))
    }

    pub fn graphs(&self) -> impl Iterator<Item = GraphId> + '_ {
        self.graphs.keys().copied()
    }

    /// Create a graph owned by `parent`, or a free-standing one.
    pub fn create_graph(&mut self, parent: Option<ComponentId>) -> GraphResult<GraphId> {
        let depth = match parent {
            Some(parent) => {
                let graph = self.component(parent)?.graph();
                self.graph(graph)?.depth() + 1
            }
            None => 0,
        };
        if depth > self.config.max_graph_depth {
            return Err(GraphError::NestingTooDeep(self.config.max_graph_depth));
        }

        let id = GraphId::new();
        self.graphs.insert(id, Graph::new(id, parent, depth));
        tracing::debug!(graph = %id, depth, "created graph");
        Ok(id)
    }

    /// Deactivate a graph and dispose its nodes, newest first. The root
    /// graph is only torn down by [`dispose`](Self::dispose).
    pub fn dispose_graph(&mut self, id: GraphId) -> bool {
        if id == self.root {
            tracing::warn!("the root graph can't be disposed on its own");
            return false;
        }
        let Some(graph) = self.graphs.get(&id) else {
            return false;
        };
        let active = graph.is_active();
        let nodes: Vec<NodeId> = graph.nodes().collect();

        if active {
            if let Err(err) = self.deactivate_graph(id) {
                tracing::warn!(graph = %id, error = %err, "deactivation failed during disposal");
            }
        }
        for node in nodes.into_iter().rev() {
            self.destroy_node(node);
        }
        self.graphs.shift_remove(&id);
        tracing::debug!(graph = %id, "disposed graph");
        true
    }

    // Nodes

    /// Create a node of a registered node type and let the type populate it.
    pub fn create_node(
        &mut self,
        graph: GraphId,
        type_name: &str,
        name: impl Into<String>,
    ) -> GraphResult<NodeId> {
        let create_components = self.types.node(type_name)?.create_components;
        let id = self.insert_node(graph, type_name, NodeId::new(), name.into())?;
        if let Err(err) = create_components(self, id) {
            self.destroy_node(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Register `T` if needed and create a node of it.
    pub fn create_node_of<T: NodeKind>(
        &mut self,
        graph: GraphId,
        name: impl Into<String>,
    ) -> GraphResult<NodeId> {
        self.register_node::<T>();
        self.create_node(graph, T::TYPE_NAME, name)
    }

    /// Add an empty node without running its type's setup.
    pub(crate) fn insert_node(
        &mut self,
        graph_id: GraphId,
        type_name: &str,
        id: NodeId,
        name: String,
    ) -> GraphResult<NodeId> {
        let descriptor = self.types.node(type_name)?;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id.to_string()));
        }

        let graph = self.graph_mut(graph_id)?;
        graph.nodes.add(id, &[descriptor.name]);
        graph.request_sort();
        self.node_index.add(id, &[descriptor.name]);
        self.nodes.insert(id, Node::new(id, graph_id, descriptor, name));

        self.observers.emit(SystemEvent::NodeCreated { id, graph: graph_id });
        tracing::debug!(node = %id, graph = %graph_id, type_name, "created node");
        Ok(id)
    }

    /// Dispose a node's components in reverse creation order, then the node.
    /// Disposal ignores the node lock.
    pub fn dispose_node(&mut self, id: NodeId) -> GraphResult<()> {
        self.node(id)?;
        self.destroy_node(id);
        Ok(())
    }

    fn destroy_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let components: Vec<ComponentId> = node.components().collect();
        for component in components.into_iter().rev() {
            self.destroy_component(component);
        }

        let Some(node) = self.nodes.shift_remove(&id) else {
            return;
        };
        if let Some(graph) = self.graphs.get_mut(&node.graph()) {
            graph.nodes.remove(id);
            graph.request_sort();
        }
        self.node_index.remove(id);

        self.observers.emit(SystemEvent::NodeDisposed { id });
        tracing::debug!(node = %id, "disposed node");
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// All nodes of all graphs, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_index.ids()
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn nodes_of_type(&self, type_name: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.node_index.by_type(type_name)
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name() == name)
            .map(Node::id)
    }

    pub fn set_node_name(&mut self, id: NodeId, name: impl Into<String>) -> GraphResult<()> {
        self.node_mut(id)?.set_name(name);
        Ok(())
    }

    /// Lock a node against component creation and disposal.
    pub fn lock_node(&mut self, id: NodeId) -> GraphResult<()> {
        self.node_mut(id)?.lock()
    }

    pub fn unlock_node(&mut self, id: NodeId) -> GraphResult<()> {
        self.node_mut(id)?.unlock();
        Ok(())
    }

    pub fn add_node_tag(&mut self, id: NodeId, tag: &str) -> GraphResult<()> {
        let node = self.node_mut(id)?;
        if !node.tags.insert(tag.to_string()) {
            return Ok(());
        }
        let graph = node.graph();
        self.node_index.add_tag(id, tag);
        let graph = self.graph_mut(graph)?;
        graph.nodes.add_tag(id, tag);
        graph.request_sort();
        Ok(())
    }

    pub fn remove_node_tag(&mut self, id: NodeId, tag: &str) -> GraphResult<()> {
        let node = self.node_mut(id)?;
        if !node.tags.shift_remove(tag) {
            return Ok(());
        }
        let graph = node.graph();
        self.node_index.remove_tag(id, tag);
        let graph = self.graph_mut(graph)?;
        graph.nodes.remove_tag(id, tag);
        graph.request_sort();
        Ok(())
    }

    /// Nodes of all graphs carrying `tag`.
    pub fn nodes_by_tag(&self, tag: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.node_index.by_tag(tag)
    }

    // Components

    /// Create a component of a registered type on `node`.
    pub fn create_component(&mut self, node: NodeId, type_name: &str) -> GraphResult<ComponentId> {
        self.create_component_with_id(node, type_name, ComponentId::new())
    }

    /// Register `T` if needed and create a component of it.
    pub fn create_component_of<T: ComponentKind>(&mut self, node: NodeId) -> GraphResult<ComponentId> {
        self.register_component::<T>()?;
        self.create_component(node, T::TYPE_NAME)
    }

    pub(crate) fn create_component_with_id(
        &mut self,
        node_id: NodeId,
        type_name: &str,
        id: ComponentId,
    ) -> GraphResult<ComponentId> {
        let descriptor = self.types.component(type_name)?;
        let node = self.node(node_id)?;
        if node.is_locked() {
            return Err(GraphError::NodeLocked(node_id));
        }
        if self.components.contains_key(&id) {
            return Err(GraphError::DuplicateId(id.to_string()));
        }
        let graph_id = node.graph();
        self.check_singleton(&descriptor, node_id, graph_id)?;

        let owner = Owner {
            component: id,
            changed: SharedFlag::new(true),
            sort: self.graph(graph_id)?.sort_requested.clone(),
        };
        let mut ins = PropertyGroup::owned(Direction::Input, owner.clone());
        let mut outs = PropertyGroup::owned(Direction::Output, owner.clone());
        (descriptor.declare_ins)(&mut ins)?;
        (descriptor.declare_outs)(&mut outs)?;
        let behavior = (descriptor.factory)();

        let hooks = descriptor.hooks;
        let types = &descriptor.ancestors;
        self.node_mut(node_id)?.components.add(id, types);
        let graph = self.graph_mut(graph_id)?;
        graph.components.add(id, types);
        if hooks.contains(Hooks::TOCK) {
            graph.tock_list.insert(id);
        }
        graph.request_sort();
        self.component_index.add(id, types);

        let component = Component::new(
            id,
            node_id,
            graph_id,
            descriptor.clone(),
            ins,
            outs,
            owner.changed,
            behavior,
        );
        self.components.insert(id, component);
        if let Some(component) = self.components.get(&id) {
            for tracker in self.trackers.values_mut() {
                tracker.did_add(component);
            }
        }

        self.observers.emit(SystemEvent::ComponentCreated {
            id,
            node: node_id,
            type_name: descriptor.name,
        });
        tracing::debug!(component = %id, node = %node_id, type_name = descriptor.name, "created component");

        if let Err(err) = self.invoke(id, UpdateContext::default(), |behavior, cx| behavior.create(cx)) {
            self.remove_component(id, false);
            return Err(err);
        }
        if hooks.contains(Hooks::ACTIVATE) && self.graph(graph_id)?.is_active() {
            if let Err(err) = self.invoke(id, UpdateContext::default(), |behavior, cx| behavior.activate(cx)) {
                self.remove_component(id, false);
                return Err(err);
            }
        }
        Ok(id)
    }

    fn check_singleton(
        &self,
        descriptor: &ComponentDescriptor,
        node: NodeId,
        graph: GraphId,
    ) -> GraphResult<()> {
        let type_name = descriptor.name;
        let taken = match descriptor.singleton {
            Singleton::None => false,
            Singleton::Node => self.node(node)?.has_component_of_type(type_name),
            Singleton::Graph => self.graph(graph)?.components.has_type(type_name),
            Singleton::System => self.component_index.has_type(type_name),
        };
        if !taken {
            return Ok(());
        }
        Err(match descriptor.singleton {
            Singleton::Graph => GraphError::GraphSingleton { type_name, graph },
            Singleton::System => GraphError::SystemSingleton { type_name },
            _ => GraphError::NodeSingleton { type_name, node },
        })
    }

    /// Dispose a component. Fails if its node is locked.
    pub fn dispose_component(&mut self, id: ComponentId) -> GraphResult<()> {
        let node = self.component(id)?.node();
        if self.node(node)?.is_locked() {
            return Err(GraphError::NodeLocked(node));
        }
        self.destroy_component(id);
        Ok(())
    }

    pub(crate) fn destroy_component(&mut self, id: ComponentId) {
        self.remove_component(id, true);
    }

    // Components that fail to come up are removed without `deactivate`.
    fn remove_component(&mut self, id: ComponentId, activated: bool) {
        let Some(component) = self.components.get(&id) else {
            return;
        };
        let graph_id = component.graph();
        let deactivate = activated
            && component.hooks().contains(Hooks::DEACTIVATE)
            && self.graphs.get(&graph_id).is_some_and(Graph::is_active);

        if deactivate {
            if let Err(err) = self.invoke(id, UpdateContext::default(), |behavior, cx| behavior.deactivate(cx)) {
                tracing::warn!(component = %id, error = %err, "deactivation failed during disposal");
            }
        }
        if let Err(err) = self.invoke(id, UpdateContext::default(), |behavior, cx| {
            behavior.dispose(cx);
            Ok(())
        }) {
            tracing::warn!(component = %id, error = %err, "dispose hook failed");
        }

        let Some(component) = self.components.get_mut(&id) else {
            return;
        };
        let node_id = component.node();
        let type_name = component.type_name();
        let owned_trackers = std::mem::take(&mut component.trackers);
        self.observers.emit(SystemEvent::ComponentDisposed { id, type_name });

        if let Some(component) = self.components.get(&id) {
            component.ins().unlink_all();
            component.outs().unlink_all();
        }
        for tracker in owned_trackers {
            self.trackers.shift_remove(&tracker);
        }
        for tracker in self.trackers.values_mut() {
            tracker.will_remove(id);
        }

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.components.remove(id);
        }
        if let Some(graph) = self.graphs.get_mut(&graph_id) {
            graph.components.remove(id);
            graph.roots.shift_remove(&id);
            graph.tock_list.shift_remove(&id);
            graph.request_sort();
        }
        self.component_index.remove(id);
        self.components.shift_remove(&id);
        tracing::debug!(component = %id, type_name, "disposed component");
    }

    pub fn component(&self, id: ComponentId) -> GraphResult<&Component> {
        self.components
            .get(&id)
            .ok_or_else(|| GraphError::ComponentNotFound(id.to_string()))
    }

    pub fn find_component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    fn component_mut(&mut self, id: ComponentId) -> GraphResult<&mut Component> {
        self.components
            .get_mut(&id)
            .ok_or_else(|| GraphError::ComponentNotFound(id.to_string()))
    }

    /// All components of all graphs, in creation order.
    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_index.ids()
    }

    pub fn component_count(&self) -> usize {
        self.component_index.len()
    }

    /// The behavior of a component, if it is a `T`. `None` while the
    /// component's own hook is running.
    pub fn behavior<T: Behavior>(&self, id: ComponentId) -> Option<&T> {
        self.components.get(&id)?.behavior::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.components.get_mut(&id)?.behavior_mut::<T>()
    }

    /// Components of `type_name` or a subtype across all graphs.
    pub fn components_of_type(&self, type_name: &str) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_index.by_type(type_name)
    }

    pub fn find_component_of_type(&self, type_name: &str) -> Option<ComponentId> {
        self.component_index.first_of_type(type_name)
    }

    pub fn component_of_type(&self, type_name: &str) -> GraphResult<ComponentId> {
        self.find_component_of_type(type_name)
            .ok_or_else(|| GraphError::ComponentNotFound(format!("'{}'", type_name)))
    }

    pub fn find_node_component(&self, node: NodeId, type_name: &str) -> Option<ComponentId> {
        self.find_node(node)?.find_component_of_type(type_name)
    }

    pub fn node_component(&self, node: NodeId, type_name: &str) -> GraphResult<ComponentId> {
        self.node(node)?.component_of_type(type_name)
    }

    pub fn find_graph_component(&self, graph: GraphId, type_name: &str) -> Option<ComponentId> {
        self.find_graph(graph)?.find_component_of_type(type_name)
    }

    pub fn graph_component(&self, graph: GraphId, type_name: &str) -> GraphResult<ComponentId> {
        self.graph(graph)?
            .find_component_of_type(type_name)
            .ok_or_else(|| GraphError::ComponentNotFound(format!("'{}' in graph {}", type_name, graph)))
    }

    pub fn set_component_name(&mut self, id: ComponentId, name: impl Into<String>) -> GraphResult<()> {
        self.component_mut(id)?.set_name(name);
        Ok(())
    }

    pub fn add_component_tag(&mut self, id: ComponentId, tag: &str) -> GraphResult<()> {
        let component = self.component_mut(id)?;
        if !component.tags.insert(tag.to_string()) {
            return Ok(());
        }
        let (node, graph) = (component.node(), component.graph());
        self.component_index.add_tag(id, tag);
        self.node_mut(node)?.components.add_tag(id, tag);
        let graph = self.graph_mut(graph)?;
        graph.components.add_tag(id, tag);
        graph.request_sort();
        Ok(())
    }

    pub fn remove_component_tag(&mut self, id: ComponentId, tag: &str) -> GraphResult<()> {
        let component = self.component_mut(id)?;
        if !component.tags.shift_remove(tag) {
            return Ok(());
        }
        let (node, graph) = (component.node(), component.graph());
        self.component_index.remove_tag(id, tag);
        self.node_mut(node)?.components.remove_tag(id, tag);
        let graph = self.graph_mut(graph)?;
        graph.components.remove_tag(id, tag);
        graph.request_sort();
        Ok(())
    }

    /// Components of all graphs carrying `tag`.
    pub fn components_by_tag(&self, tag: &str) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_index.by_tag(tag)
    }

    // Properties and links

    /// A component property by path, `ins.key` or `outs.key`.
    pub fn property(&self, component: ComponentId, path: &str) -> GraphResult<&Property> {
        self.component(component)?.property(path)
    }

    /// Link `source_path` on `source` to the input `target_path` on `target`.
    pub fn link(
        &self,
        source: ComponentId,
        source_path: &str,
        target: ComponentId,
        target_path: &str,
    ) -> GraphResult<()> {
        self.link_indexed(source, source_path, target, target_path, None, None)
    }

    /// [`link`](Self::link) between vector elements.
    pub fn link_indexed(
        &self,
        source: ComponentId,
        source_path: &str,
        target: ComponentId,
        target_path: &str,
        source_index: Option<usize>,
        target_index: Option<usize>,
    ) -> GraphResult<()> {
        let from = self.property(source, source_path)?;
        let to = self.property(target, target_path)?;
        from.link_to(to, source_index, target_index)
    }

    pub fn unlink(
        &self,
        source: ComponentId,
        source_path: &str,
        target: ComponentId,
        target_path: &str,
    ) -> GraphResult<bool> {
        let from = self.property(source, source_path)?;
        let to = self.property(target, target_path)?;
        Ok(from.unlink(to))
    }

    // Trackers

    /// Register a tracker. Matching components that already exist are
    /// reported immediately.
    pub fn track_components(&mut self, mut tracker: ComponentTracker) -> TrackerId {
        let existing: Vec<ComponentId> = self.component_index.by_type(tracker.type_name()).collect();
        for id in existing {
            if let Some(component) = self.components.get(&id) {
                tracker.did_add(component);
            }
        }
        let id = tracker.id();
        self.trackers.insert(id, tracker);
        id
    }

    pub fn tracker(&self, id: TrackerId) -> Option<&ComponentTracker> {
        self.trackers.get(&id)
    }

    pub fn dispose_tracker(&mut self, id: TrackerId) -> bool {
        self.trackers.shift_remove(&id).is_some()
    }

    // Root graph scheduling

    pub fn activate(&mut self) -> GraphResult<()> {
        self.activate_graph(self.root)
    }

    pub fn deactivate(&mut self) -> GraphResult<()> {
        self.deactivate_graph(self.root)
    }

    pub fn is_active(&self) -> bool {
        self.graphs.get(&self.root).is_some_and(Graph::is_active)
    }

    pub fn tick(&mut self, frame: &UpdateContext) -> GraphResult<bool> {
        self.tick_graph(self.root, frame)
    }

    pub fn tock(&mut self, frame: &UpdateContext) -> GraphResult<bool> {
        self.tock_graph(self.root, frame)
    }

    /// Tick then tock the root graph. Returns whether anything updated
    /// during the tick.
    pub fn run_frame(&mut self, frame: &UpdateContext) -> GraphResult<bool> {
        let updated = self.tick(frame)?;
        self.tock(frame)?;
        Ok(updated)
    }

    /// Tear everything down: deactivate, dispose all nodes newest first,
    /// drop trackers and observers.
    pub fn dispose(&mut self) {
        if let Err(err) = self.deactivate() {
            tracing::warn!(error = %err, "deactivation failed during system disposal");
        }

        let nodes: Vec<NodeId> = self
            .graphs
            .get(&self.root)
            .map(|graph| graph.nodes().collect())
            .unwrap_or_default();
        for node in nodes.into_iter().rev() {
            self.destroy_node(node);
        }

        let root = self.root;
        let detached: Vec<GraphId> = self.graphs.keys().copied().filter(|id| *id != root).collect();
        for graph in detached.into_iter().rev() {
            self.dispose_graph(graph);
        }

        self.trackers.clear();
        self.pending.clear();
        self.observers.clear();
        tracing::debug!("disposed system");
    }

    /// Call a behavior hook with the behavior detached from its component.
    ///
    /// Returns `Ok(None)` when the component doesn't exist or its behavior
    /// is already running further up the stack.
    pub(crate) fn invoke<R>(
        &mut self,
        id: ComponentId,
        frame: UpdateContext,
        call: impl FnOnce(&mut dyn Behavior, &mut ComponentContext<'_>) -> GraphResult<R>,
    ) -> GraphResult<Option<R>> {
        let Some(component) = self.components.get_mut(&id) else {
            return Ok(None);
        };
        let Some(mut behavior) = component.behavior.take() else {
            return Ok(None);
        };
        let node = component.node();
        let graph = component.graph();
        let ins = component.ins().clone();
        let outs = component.outs().clone();

        let result = {
            let mut cx = ComponentContext {
                system: self,
                id,
                node,
                graph,
                ins,
                outs,
                frame,
            };
            call(behavior.as_mut(), &mut cx)
        };

        if let Some(component) = self.components.get_mut(&id) {
            component.behavior = Some(behavior);
        }
        result.map(Some)
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
