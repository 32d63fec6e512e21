//! Graphs and their schedules.
//!
//! A graph owns a set of nodes, the components on them, and a cached
//! evaluation order over those components derived from their property
//! links. Structural changes and link changes only mark the order stale;
//! it is recomputed lazily on the next activation or tick.
//!
//! Graphs nest: a graph-owning component holds an inner graph and forwards
//! its own `tick` and `tock` into it, so each level runs its own independent
//! schedule.

mod container;
mod scheduler;
mod sorter;

pub use container::Graph;
pub use sorter::{LinkableSorter, SortOutcome};
