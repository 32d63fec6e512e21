//! Component trackers.

use std::fmt;

use indexmap::IndexSet;

use super::instance::Component;
use crate::ids::{ComponentId, GraphId, NodeId, TrackerId};

/// Where a tracker looks for components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerScope {
    Node(NodeId),
    Graph(GraphId),
    System,
}

type Callback = Box<dyn FnMut(ComponentId)>;

/// Watches a scope for components of a type coming and going.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use trellis_core::{ComponentTracker, TrackerScope};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
/// let tracker = ComponentTracker::new(TrackerScope::System, "Light")
///     .on_add(move |id| log.borrow_mut().push(id));
/// assert!(tracker.component().is_none());
/// ```
pub struct ComponentTracker {
    id: TrackerId,
    type_name: String,
    scope: TrackerScope,
    owner: Option<ComponentId>,
    matches: IndexSet<ComponentId>,
    on_add: Option<Callback>,
    on_remove: Option<Callback>,
}

impl ComponentTracker {
    pub fn new(scope: TrackerScope, type_name: impl Into<String>) -> Self {
        Self {
            id: TrackerId::new(),
            type_name: type_name.into(),
            scope,
            owner: None,
            matches: IndexSet::new(),
            on_add: None,
            on_remove: None,
        }
    }

    /// Called with each matching component, including the ones present
    /// when the tracker is registered.
    pub fn on_add(mut self, callback: impl FnMut(ComponentId) + 'static) -> Self {
        self.on_add = Some(Box::new(callback));
        self
    }

    /// Called with each matching component about to be removed.
    pub fn on_remove(mut self, callback: impl FnMut(ComponentId) + 'static) -> Self {
        self.on_remove = Some(Box::new(callback));
        self
    }

    pub(crate) fn owned_by(mut self, owner: ComponentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn scope(&self) -> TrackerScope {
        self.scope
    }

    /// The component that registered this tracker, if any.
    pub fn owner(&self) -> Option<ComponentId> {
        self.owner
    }

    /// The first live match.
    pub fn component(&self) -> Option<ComponentId> {
        self.matches.first().copied()
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.matches.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn accepts(&self, component: &Component) -> bool {
        let in_scope = match self.scope {
            TrackerScope::Node(node) => component.node() == node,
            TrackerScope::Graph(graph) => component.graph() == graph,
            TrackerScope::System => true,
        };
        in_scope && component.is(&self.type_name)
    }

    pub(crate) fn did_add(&mut self, component: &Component) {
        if self.accepts(component) && self.matches.insert(component.id()) {
            if let Some(callback) = self.on_add.as_mut() {
                callback(component.id());
            }
        }
    }

    pub(crate) fn will_remove(&mut self, id: ComponentId) {
        if self.matches.shift_remove(&id) {
            if let Some(callback) = self.on_remove.as_mut() {
                callback(id);
            }
        }
    }
}

impl fmt::Debug for ComponentTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTracker")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("scope", &self.scope)
            .field("matches", &self.matches.len())
            .finish()
    }
}
