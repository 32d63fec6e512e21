//! The per-kind behavior trait.

use std::any::Any;

use super::context::ComponentContext;
use crate::error::GraphResult;
use crate::system::System;

/// Upcast to `Any` for downcasting boxed behaviors.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a component does.
///
/// Every method has an empty default. The scheduler only calls `activate`,
/// `deactivate`, `update`, `tick` and `tock` when the kind declares the
/// matching [`Hooks`](crate::Hooks) bit; `create` and `dispose` are always
/// called.
///
/// While a hook runs the behavior is detached from its component, so
/// `System::behavior` returns `None` for the component being called.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Called once after the component is attached to its node.
    fn create(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        Ok(())
    }

    fn activate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        Ok(())
    }

    fn deactivate(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        Ok(())
    }

    /// Called during a tick when any input changed. Returns whether the
    /// component updated.
    fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        Ok(false)
    }

    /// Called once per tick.
    fn tick(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        Ok(false)
    }

    /// Called once per frame after every graph has ticked.
    fn tock(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
        Ok(false)
    }

    /// Called before the component is detached.
    fn dispose(&mut self, cx: &mut ComponentContext<'_>) {}

    /// Extra state written to the component's `data` field.
    fn save(&self, system: &System) -> GraphResult<Option<serde_json::Value>> {
        Ok(None)
    }

    /// Restore state written by [`save`](Self::save). References to other
    /// objects may not exist yet; resolve those in
    /// [`resolve_references`](Self::resolve_references).
    fn load(&mut self, data: &serde_json::Value, cx: &mut ComponentContext<'_>) -> GraphResult<()> {
        Ok(())
    }

    /// Second loading pass, after every object of the document exists.
    fn resolve_references(
        &mut self,
        data: &serde_json::Value,
        cx: &mut ComponentContext<'_>,
    ) -> GraphResult<()> {
        Ok(())
    }
}
