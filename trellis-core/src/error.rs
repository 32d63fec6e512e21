//! Error types for the graph runtime.
//!
//! Constraint violations and strict lookup misses are reported through
//! [`GraphError`]. Permissive lookups return `Option` instead and never
//! produce an error.

use thiserror::Error;

use crate::ids::{ComponentId, GraphId, NodeId};

/// Result type for graph runtime operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by the graph runtime.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node-singleton component type already exists on the node.
    #[error("only one component of type '{type_name}' allowed per node (node {node})")]
    NodeSingleton { type_name: &'static str, node: NodeId },

    /// A graph-singleton component type already exists in the graph.
    #[error("only one component of type '{type_name}' allowed per graph (graph {graph})")]
    GraphSingleton { type_name: &'static str, graph: GraphId },

    /// A system-singleton component type already exists in the system.
    #[error("only one component of type '{type_name}' allowed per system")]
    SystemSingleton { type_name: &'static str },

    /// Structural change attempted on a locked node.
    #[error("node {0} is locked")]
    NodeLocked(NodeId),

    /// The node was locked, then unlocked, and can't be locked again.
    #[error("node {0} was unlocked after being locked and can't be locked again")]
    Relock(NodeId),

    /// No component type registered under the name.
    #[error("unknown component type '{0}'")]
    UnknownComponentType(String),

    /// No node type registered under the name.
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// Strict component lookup failed.
    #[error("component not found: {0}")]
    ComponentNotFound(String),

    /// Strict node lookup failed.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Graph id not registered with the system.
    #[error("graph {0} not found")]
    GraphNotFound(GraphId),

    /// Property key not present in the group.
    #[error("property '{0}' not found")]
    PropertyNotFound(String),

    /// A property with this key already exists in the group.
    #[error("property '{0}' already exists")]
    DuplicateProperty(String),

    /// The two properties can't be linked.
    #[error("can't link '{from}' to '{to}': {reason}")]
    IncompatibleLink {
        from: String,
        to: String,
        reason: &'static str,
    },

    /// The same source is already linked to the target with the same indices.
    #[error("property '{0}' already has this incoming link")]
    DuplicateLink(String),

    /// Attempt to link a property to itself.
    #[error("can't link property '{0}' to itself")]
    SelfLink(String),

    /// Written value can't be converted to the property's type.
    #[error("property '{key}' expects {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A component reference was pointed at a component of the wrong type.
    #[error("component {id} of type '{actual}' is not a '{expected}'")]
    IncompatibleReference {
        id: ComponentId,
        expected: &'static str,
        actual: &'static str,
    },

    /// Nested graphs exceed the configured depth.
    #[error("graph nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),

    /// Hierarchy attach would create a cycle or cross graphs.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// An object with the same id is already registered.
    #[error("duplicate id {0}")]
    DuplicateId(String),

    /// A serialized reference couldn't be resolved (strict mode only).
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// The document is structurally invalid.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// JSON encoding or decoding failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
