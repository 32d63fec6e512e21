//! Built-in component kinds, registered with every system.

mod graph;
mod hierarchy;

pub use graph::GraphComponent;
pub use hierarchy::Hierarchy;
