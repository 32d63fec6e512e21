//! Identifiers for graphs, nodes, components and trackers.
//!
//! Graph, node and component ids are globally unique and survive a JSON
//! round trip, so they are backed by UUIDs. Tracker and subscription ids are
//! process-local counters.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a [`Graph`](crate::graph::Graph).
    GraphId
);

uuid_id!(
    /// Unique identifier of a [`Node`](crate::node::Node).
    NodeId
);

uuid_id!(
    /// Unique identifier of a [`Component`](crate::component::Component).
    ComponentId
);

macro_rules! counter_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Generate a new unique id.
            pub fn new() -> Self {
                static COUNTER: AtomicU64 = AtomicU64::new(0);
                Self(COUNTER.fetch_add(1, Ordering::Relaxed))
            }

            /// Get the raw id value.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

counter_id!(
    /// Identifier of a registered [`ComponentTracker`](crate::component::ComponentTracker).
    TrackerId
);

counter_id!(
    /// Identifier of a property cell, used to guard link propagation.
    PropertyId
);

counter_id!(
    /// Identifier of an event observer registered with the system.
    SubscriptionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique_and_parse_back() {
        let a = ComponentId::new();
        let b = ComponentId::new();
        assert_ne!(a, b);

        let parsed: ComponentId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = NodeId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn counter_ids_are_unique() {
        let t1 = TrackerId::new();
        let t2 = TrackerId::new();
        assert_ne!(t1, t2);
        assert!(t2.raw() > t1.raw());
    }
}
