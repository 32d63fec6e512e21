//! Type and tag indexes.
//!
//! Every registered object is filed under each of its type names (its own
//! plus its ancestors') and under each of its tags, so lookups by type or tag
//! never walk the object tree.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Flat index of objects keyed by id, type name and tag.
#[derive(Debug, Clone)]
pub struct ObjectRegistry<K> {
    all: IndexSet<K>,
    by_type: IndexMap<&'static str, IndexSet<K>>,
    by_tag: IndexMap<String, IndexSet<K>>,
}

impl<K: Copy + Eq + Hash> ObjectRegistry<K> {
    pub fn new() -> Self {
        Self {
            all: IndexSet::new(),
            by_type: IndexMap::new(),
            by_tag: IndexMap::new(),
        }
    }

    /// Register `id` under each of `types`.
    pub fn add(&mut self, id: K, types: &[&'static str]) {
        self.all.insert(id);
        for &type_name in types {
            self.by_type.entry(type_name).or_default().insert(id);
        }
    }

    /// Drop `id` from every index.
    pub fn remove(&mut self, id: K) -> bool {
        if !self.all.shift_remove(&id) {
            return false;
        }
        self.by_type.retain(|_, ids| {
            ids.shift_remove(&id);
            !ids.is_empty()
        });
        self.by_tag.retain(|_, ids| {
            ids.shift_remove(&id);
            !ids.is_empty()
        });
        true
    }

    pub fn contains(&self, id: K) -> bool {
        self.all.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.all.iter().copied()
    }

    /// Ids registered under `type_name`, in registration order.
    pub fn by_type(&self, type_name: &str) -> impl Iterator<Item = K> + '_ {
        self.by_type.get(type_name).into_iter().flatten().copied()
    }

    pub fn first_of_type(&self, type_name: &str) -> Option<K> {
        self.by_type.get(type_name)?.first().copied()
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    pub fn count_of_type(&self, type_name: &str) -> usize {
        self.by_type.get(type_name).map_or(0, IndexSet::len)
    }

    pub fn add_tag(&mut self, id: K, tag: &str) {
        if self.all.contains(&id) {
            self.by_tag.entry(tag.to_string()).or_default().insert(id);
        }
    }

    pub fn remove_tag(&mut self, id: K, tag: &str) {
        if let Some(ids) = self.by_tag.get_mut(tag) {
            ids.shift_remove(&id);
            if ids.is_empty() {
                self.by_tag.shift_remove(tag);
            }
        }
    }

    /// Ids carrying `tag`, in tagging order.
    pub fn by_tag(&self, tag: &str) -> impl Iterator<Item = K> + '_ {
        self.by_tag.get(tag).into_iter().flatten().copied()
    }
}

impl<K: Copy + Eq + Hash> Default for ObjectRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
