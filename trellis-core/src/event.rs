//! System events and their observers.
//!
//! Structural and per-frame notifications are delivered synchronously to
//! every registered observer, in registration order.

use std::fmt;

use crate::ids::{ComponentId, GraphId, NodeId, SubscriptionId};

/// Notification emitted by the system.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    /// A node was added to a graph.
    NodeCreated { id: NodeId, graph: GraphId },
    /// A node and all its components were removed.
    NodeDisposed { id: NodeId },
    /// A component was attached to a node.
    ComponentCreated {
        id: ComponentId,
        node: NodeId,
        type_name: &'static str,
    },
    /// A component is being disposed.
    ComponentDisposed {
        id: ComponentId,
        type_name: &'static str,
    },
    /// A component reported an update during a tick.
    ComponentUpdated { id: ComponentId },
    /// A graph became active.
    GraphActivated(GraphId),
    /// A graph became inactive.
    GraphDeactivated(GraphId),
}

type Callback = Box<dyn FnMut(&SystemEvent)>;

/// Registered event observers.
#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SystemEvent) + 'static,
    {
        let id = SubscriptionId::new();
        self.entries.push((id, Box::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: SystemEvent) {
        for (_, callback) in self.entries.iter_mut() {
            callback(&event);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_receive_events_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut observers = Observers::default();
        let id = observers.subscribe(move |event| seen_clone.borrow_mut().push(event.clone()));

        let graph = GraphId::new();
        observers.emit(SystemEvent::GraphActivated(graph));
        assert_eq!(seen.borrow().len(), 1);

        assert!(observers.unsubscribe(id));
        observers.emit(SystemEvent::GraphDeactivated(graph));
        assert_eq!(seen.borrow().len(), 1);

        assert!(!observers.unsubscribe(id));
    }
}
