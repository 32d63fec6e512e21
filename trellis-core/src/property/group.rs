//! Keyed property groups.

use std::sync::Arc;

use indexmap::IndexMap;

use super::cell::{Direction, Owner, Property};
use super::schema::PropertySchema;
use super::value::Value;
use crate::error::{GraphError, GraphResult};

/// An ordered set of properties of one direction.
///
/// Cloning a group is cheap; the key map is shared until a clone is
/// modified. Property handles themselves are always shared.
#[derive(Debug, Clone)]
pub struct PropertyGroup {
    direction: Direction,
    owner: Option<Owner>,
    properties: Arc<IndexMap<String, Property>>,
}

impl PropertyGroup {
    /// A free-standing group.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            owner: None,
            properties: Arc::new(IndexMap::new()),
        }
    }

    pub(crate) fn owned(direction: Direction, owner: Owner) -> Self {
        Self {
            direction,
            owner: Some(owner),
            properties: Arc::new(IndexMap::new()),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Declare a property. Keys are unique within a group.
    pub fn add(&mut self, key: impl Into<String>, schema: PropertySchema) -> GraphResult<Property> {
        let key = key.into();
        if self.properties.contains_key(&key) {
            return Err(GraphError::DuplicateProperty(format!(
                "{}.{}",
                self.direction.group_name(),
                key
            )));
        }
        let property = Property::with_owner(key.clone(), self.direction, schema, self.owner.clone());
        Arc::make_mut(&mut self.properties).insert(key, property.clone());
        Ok(property)
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Like [`get`](Self::get) but fails with `PropertyNotFound`.
    pub fn property(&self, key: &str) -> GraphResult<&Property> {
        self.properties.get(key).ok_or_else(|| {
            GraphError::PropertyNotFound(format!("{}.{}", self.direction.group_name(), key))
        })
    }

    pub fn value(&self, key: &str) -> GraphResult<Value> {
        Ok(self.property(key)?.value())
    }

    pub fn set_value(&self, key: &str, value: impl Into<Value>) -> GraphResult<()> {
        self.property(key)?.set_value(value)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Whether any property has its changed bit raised.
    pub fn is_changed(&self) -> bool {
        self.iter().any(Property::is_changed)
    }

    pub fn reset_changed(&self) {
        for property in self.iter() {
            property.reset_changed();
        }
    }

    pub fn unlink_all(&self) {
        for property in self.iter() {
            property.unlink_all();
        }
    }
}
