//! Weak, id-based component references.

use serde::{Deserialize, Serialize};

use super::instance::Component;
use crate::error::{GraphError, GraphResult};
use crate::ids::ComponentId;
use crate::system::System;
use crate::types::ComponentKind;

/// A reference to a component by id.
///
/// The reference never owns its target. Every access goes through the
/// system's registry, so a disposed target reads as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentReference {
    id: Option<ComponentId>,
    type_name: Option<&'static str>,
}

impl ComponentReference {
    /// A reference constrained to `type_name` and its subtypes, or
    /// unconstrained for `None`.
    pub fn new(type_name: Option<&'static str>) -> Self {
        Self { id: None, type_name }
    }

    pub fn typed<T: ComponentKind>() -> Self {
        Self::new(Some(T::TYPE_NAME))
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    /// The stored id, whether or not the target still exists.
    pub fn id(&self) -> Option<ComponentId> {
        self.id
    }

    /// Point at `target`, or clear the reference with `None`.
    pub fn set(&mut self, system: &System, target: Option<ComponentId>) -> GraphResult<()> {
        if let Some(id) = target {
            let component = system.component(id)?;
            if let Some(expected) = self.type_name {
                if !component.is(expected) {
                    return Err(GraphError::IncompatibleReference {
                        id,
                        expected,
                        actual: component.type_name(),
                    });
                }
            }
        }
        self.id = target;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.id = None;
    }

    /// The live target, if it is still registered.
    pub fn get<'s>(&self, system: &'s System) -> Option<&'s Component> {
        system.find_component(self.id?)
    }

    /// Live target id.
    pub fn resolve(&self, system: &System) -> Option<ComponentId> {
        self.get(system).map(Component::id)
    }

    pub fn is_set(&self) -> bool {
        self.id.is_some()
    }

    /// Document form: the id, or `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self.id {
            Some(id) => serde_json::Value::String(id.to_string()),
            None => serde_json::Value::Null,
        }
    }

    /// Restore from [`to_json`](Self::to_json) output. A missing or
    /// mistyped target leaves the reference empty unless the system is
    /// configured for strict references.
    pub fn from_json(&mut self, value: &serde_json::Value, system: &System) -> GraphResult<()> {
        let id = match value {
            serde_json::Value::Null => None,
            value => Some(ComponentId::deserialize(value)?),
        };
        match self.set(system, id) {
            Ok(()) => Ok(()),
            Err(err) if system.config().strict_references => {
                Err(GraphError::UnresolvedReference(err.to_string()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "component reference not resolved");
                self.id = None;
                Ok(())
            }
        }
    }
}

impl Serialize for ComponentReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}
