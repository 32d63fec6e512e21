//! Nodes: named containers of components.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::component::Component;
use crate::error::{GraphError, GraphResult};
use crate::ids::{ComponentId, GraphId, NodeId};
use crate::registry::ObjectRegistry;
use crate::types::NodeDescriptor;

/// Structural lock of a node.
///
/// A node starts undecided. Once locked it can be unlocked, but a node that
/// was unlocked after being locked can never be locked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Undecided,
    Unlocked,
    Locked,
    /// Unlocked after having been locked.
    Released,
}

impl LockState {
    /// Document form: `Some(true)` when locked, `Some(false)` once decided
    /// otherwise, `None` while undecided.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            LockState::Undecided => None,
            LockState::Locked => Some(true),
            LockState::Unlocked | LockState::Released => Some(false),
        }
    }
}

/// A named container of components, owned by one graph.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    graph: GraphId,
    descriptor: Arc<NodeDescriptor>,
    name: String,
    pub(crate) tags: IndexSet<String>,
    lock: LockState,
    pub(crate) components: ObjectRegistry<ComponentId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, graph: GraphId, descriptor: Arc<NodeDescriptor>, name: String) -> Self {
        Self {
            id,
            graph,
            descriptor,
            name,
            tags: IndexSet::new(),
            lock: LockState::Undecided,
            components: ObjectRegistry::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

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

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock == LockState::Locked
    }

    pub(crate) fn lock(&mut self) -> GraphResult<()> {
        self.lock = match self.lock {
            LockState::Released => return Err(GraphError::Relock(self.id)),
            _ => LockState::Locked,
        };
        Ok(())
    }

    pub(crate) fn unlock(&mut self) {
        self.lock = match self.lock {
            LockState::Locked | LockState::Released => LockState::Released,
            LockState::Undecided | LockState::Unlocked => LockState::Unlocked,
        };
    }

    /// Components in creation order.
    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.ids()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn contains(&self, component: ComponentId) -> bool {
        self.components.contains(component)
    }

    /// Components of `type_name` or a subtype, in creation order.
    pub fn components_of_type(&self, type_name: &str) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.by_type(type_name)
    }

    pub fn find_component_of_type(&self, type_name: &str) -> Option<ComponentId> {
        self.components.first_of_type(type_name)
    }

    /// Strict variant of [`find_component_of_type`](Self::find_component_of_type).
    pub fn component_of_type(&self, type_name: &str) -> GraphResult<ComponentId> {
        self.find_component_of_type(type_name).ok_or_else(|| {
            GraphError::ComponentNotFound(format!("'{}' on node '{}'", type_name, self.display_name()))
        })
    }

    pub fn has_component_of_type(&self, type_name: &str) -> bool {
        self.components.has_type(type_name)
    }

    /// Whether `component` is written out when the node is serialized.
    pub fn persists(&self, component: &Component) -> bool {
        (self.descriptor.persists)(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaseNode, TypeRegistry};

    fn node() -> Node {
        let mut types = TypeRegistry::new();
        types.register_node::<BaseNode>();
        Node::new(NodeId::new(), GraphId::new(), types.node("Node").unwrap(), String::new())
    }

    #[test]
    fn lock_transitions() {
        let mut node = node();
        assert_eq!(node.lock_state(), LockState::Undecided);
        assert_eq!(node.lock_state().as_flag(), None);

        node.unlock();
        assert_eq!(node.lock_state(), LockState::Unlocked);
        node.lock().unwrap();
        assert!(node.is_locked());

        node.lock().unwrap();
        assert!(node.is_locked());

        node.unlock();
        assert_eq!(node.lock_state(), LockState::Released);
        assert_eq!(node.lock_state().as_flag(), Some(false));
        assert!(matches!(node.lock(), Err(GraphError::Relock(_))));
    }

    #[test]
    fn display_name_falls_back_to_type() {
        let mut node = node();
        assert_eq!(node.display_name(), "Node");
        node.set_name("Camera");
        assert_eq!(node.display_name(), "Camera");
    }
}
