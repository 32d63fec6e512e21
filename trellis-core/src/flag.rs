//! Shared dirty bits.
//!
//! A component's `changed` bit and a graph's `sort requested` bit are written
//! from places that only hold a property handle, so both are shared cells
//! rather than plain fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A boolean flag shared between its owner and any number of writers.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedFlag(Arc<AtomicBool>);

impl SharedFlag {
    /// Create a flag with the given initial state.
    pub(crate) fn new(state: bool) -> Self {
        Self(Arc::new(AtomicBool::new(state)))
    }

    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag, returning whether it was set.
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}
