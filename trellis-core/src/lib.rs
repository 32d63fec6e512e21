//! Trellis Core
//!
//! This crate provides the runtime that scene documents are built on: a
//! typed, reactive dataflow and scheduling engine. It implements:
//!
//! - Entity containment: System, Graph, Node, Component
//! - Typed properties with change tracking and point-to-point links
//! - A dependency-ordered per-frame scheduler with nested graphs
//! - Lifecycle management: singletons, locking, tags, trackers, references
//! - JSON documents with deferred reference resolution
//!
//! # Architecture
//!
//! - `system`: arenas of graphs, nodes and components plus global indexes
//! - `graph`: per-graph evaluation order and the tick/tock scheduler
//! - `node`, `component`: containers and typed units of behavior
//! - `property`: value cells, schemas and links
//! - `types`: component and node kinds, constructed by registered name
//! - `serialization`: document types and the two-pass loader
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{
//!     Behavior, ComponentContext, ComponentKind, GraphResult, Hooks, PropertyGroup,
//!     PropertySchema, Pulse, System,
//! };
//!
//! #[derive(Default)]
//! struct Source;
//!
//! impl Behavior for Source {}
//!
//! impl ComponentKind for Source {
//!     const TYPE_NAME: &'static str = "Source";
//!
//!     fn declare_outs(outs: &mut PropertyGroup) -> GraphResult<()> {
//!         outs.add("value", PropertySchema::number(0.0))?;
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Doubler {
//!     last: f64,
//! }
//!
//! impl Behavior for Doubler {
//!     fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
//!         self.last = cx.ins.property("value")?.number() * 2.0;
//!         Ok(true)
//!     }
//! }
//!
//! impl ComponentKind for Doubler {
//!     const TYPE_NAME: &'static str = "Doubler";
//!     const HOOKS: Hooks = Hooks::UPDATE;
//!
//!     fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
//!         ins.add("value", PropertySchema::number(0.0))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut system = System::new();
//! let node = system.create_node(system.root(), "Node", "Example").unwrap();
//! let source = system.create_component_of::<Source>(node).unwrap();
//! let doubler = system.create_component_of::<Doubler>(node).unwrap();
//! system.link(source, "outs.value", doubler, "ins.value").unwrap();
//!
//! system.activate().unwrap();
//! system.property(source, "outs.value").unwrap().set_value(21.0).unwrap();
//!
//! let mut pulse = Pulse::new();
//! system.run_frame(&pulse.advance(1.0 / 60.0)).unwrap();
//! assert_eq!(system.behavior::<Doubler>(doubler).unwrap().last, 42.0);
//! ```

pub mod component;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
mod flag;
pub mod graph;
pub mod ids;
pub mod node;
pub mod property;
pub mod pulse;
pub mod registry;
pub mod serialization;
pub mod system;
pub mod types;

pub use component::{
    AsAny, Behavior, Component, ComponentContext, ComponentReference, ComponentTracker,
    TrackerScope,
};
pub use components::{GraphComponent, Hierarchy};
pub use config::SystemConfig;
pub use error::{GraphError, GraphResult};
pub use event::SystemEvent;
pub use graph::{Graph, LinkableSorter, SortOutcome};
pub use ids::{ComponentId, GraphId, NodeId, PropertyId, SubscriptionId, TrackerId};
pub use node::{LockState, Node};
pub use property::{Direction, LinkInfo, Property, PropertyGroup, PropertySchema, Value, ValueType};
pub use pulse::{Pulse, UpdateContext};
pub use registry::ObjectRegistry;
pub use serialization::{
    ComponentDocument, GraphDocument, LinkDocument, NodeDocument, PropertyDocument,
};
pub use system::System;
pub use types::{
    BaseNode, ComponentDescriptor, ComponentKind, Hooks, NodeDescriptor, NodeKind, Singleton,
    TypeRegistry,
};
