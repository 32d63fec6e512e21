//! Components: instances, behaviors, and the helpers components use to
//! find each other.

mod behavior;
mod context;
mod instance;
mod reference;
mod tracker;

pub use behavior::{AsAny, Behavior};
pub use context::ComponentContext;
pub use instance::Component;
pub use reference::ComponentReference;
pub use tracker::{ComponentTracker, TrackerScope};
