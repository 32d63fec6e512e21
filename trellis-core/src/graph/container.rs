//! Graph data: nodes, components and the cached evaluation order.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::flag::SharedFlag;
use crate::ids::{ComponentId, GraphId, NodeId};
use crate::registry::ObjectRegistry;

/// An ordered collection of nodes and their components with its own
/// evaluation schedule.
///
/// A graph is either the system's root graph or the inner graph of a
/// graph-owning component, its `parent`.
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    parent: Option<ComponentId>,
    depth: usize,
    pub(crate) nodes: ObjectRegistry<NodeId>,
    pub(crate) components: ObjectRegistry<ComponentId>,
    pub(crate) roots: IndexSet<ComponentId>,
    pub(crate) tock_list: IndexSet<ComponentId>,
    pub(crate) sorted: Arc<[ComponentId]>,
    pub(crate) broken_cycles: Vec<ComponentId>,
    pub(crate) sort_requested: SharedFlag,
    pub(crate) active: bool,
}

impl Graph {
    pub(crate) fn new(id: GraphId, parent: Option<ComponentId>, depth: usize) -> Self {
        Self {
            id,
            parent,
            depth,
            nodes: ObjectRegistry::new(),
            components: ObjectRegistry::new(),
            roots: IndexSet::new(),
            tock_list: IndexSet::new(),
            sorted: Arc::from(Vec::new()),
            broken_cycles: Vec::new(),
            sort_requested: SharedFlag::new(false),
            active: false,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// The component owning this graph; `None` for the root graph.
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    /// Nesting depth; the root graph is at 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the cached order stale. It is recomputed on the next
    /// activation or tick.
    pub fn request_sort(&self) {
        self.sort_requested.set();
    }

    pub fn is_sort_requested(&self) -> bool {
        self.sort_requested.get()
    }

    /// Components in evaluation order as of the last sort.
    pub fn sorted_components(&self) -> &[ComponentId] {
        &self.sorted
    }

    /// Components the last sort placed ahead of an unsatisfied dependency.
    pub fn broken_cycles(&self) -> &[ComponentId] {
        &self.broken_cycles
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.ids()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_by_tag(&self, tag: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.by_tag(tag)
    }

    /// Components in creation order.
    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.ids()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components_of_type(&self, type_name: &str) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.by_type(type_name)
    }

    pub fn find_component_of_type(&self, type_name: &str) -> Option<ComponentId> {
        self.components.first_of_type(type_name)
    }

    pub fn components_by_tag(&self, tag: &str) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.by_tag(tag)
    }

    /// Hierarchy entry points.
    pub fn roots(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.roots.iter().copied()
    }

    /// Components with a `tock` hook.
    pub fn tock_components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.tock_list.iter().copied()
    }
}
