//! Property cells.
//!
//! A [`Property`] is a cheap, cloneable handle to a typed value cell. Writes
//! go through the handle so the cell can raise its `changed` bit, flag its
//! owning component and push the new value along every outgoing link.
//!
//! # Links
//!
//! A link is a directed edge from any property to an input property. Linking
//! requests a resort of both owning graphs, since the evaluation order may
//! have changed. Propagation is a plain value copy: it marks the downstream
//! input (and its component) changed but never runs component logic.
//!
//! Links hold weak handles, so a dropped property silently stops receiving.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::schema::PropertySchema;
use super::value::{Value, ValueType, Vector};
use crate::error::{GraphError, GraphResult};
use crate::flag::SharedFlag;
use crate::ids::{ComponentId, PropertyId};

/// Which group of its component a property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Group name used in paths and documents.
    pub fn group_name(&self) -> &'static str {
        match self {
            Direction::Input => "ins",
            Direction::Output => "outs",
        }
    }

    pub fn from_group_name(name: &str) -> Option<Self> {
        match name {
            "ins" => Some(Direction::Input),
            "outs" => Some(Direction::Output),
            _ => None,
        }
    }
}

/// Back-reference from a property to the component that owns it.
#[derive(Debug, Clone)]
pub(crate) struct Owner {
    pub(crate) component: ComponentId,
    pub(crate) changed: SharedFlag,
    pub(crate) sort: SharedFlag,
}

struct Shared {
    id: PropertyId,
    key: String,
    direction: Direction,
    schema: PropertySchema,
    owner: Option<Owner>,
    state: RwLock<State>,
}

struct State {
    value: Value,
    changed: bool,
    outgoing: SmallVec<[Edge; 2]>,
    incoming: SmallVec<[Edge; 1]>,
}

#[derive(Clone)]
struct Edge {
    peer: Weak<Shared>,
    peer_id: PropertyId,
    source_index: Option<usize>,
    target_index: Option<usize>,
}

impl Shared {
    fn path(&self) -> String {
        format!("{}.{}", self.direction.group_name(), self.key)
    }

    fn mark_owner_changed(&self) {
        if self.direction == Direction::Input {
            if let Some(owner) = &self.owner {
                owner.changed.set();
            }
        }
    }

    fn request_sort(&self) {
        if let Some(owner) = &self.owner {
            owner.sort.set();
        }
    }

    /// Value this cell takes when `value` arrives over `edge`.
    fn transfer(&self, value: &Value, edge: &Edge) -> Option<Value> {
        let element;
        let source = match edge.source_index {
            Some(i) => {
                element = Value::Number(*value.as_vector()?.get(i)?);
                &element
            }
            None => value,
        };

        match edge.target_index {
            Some(j) => {
                let number = source.as_number()?;
                let mut current: Vector = self.state.read().value.as_vector()?.iter().copied().collect();
                *current.get_mut(j)? = number;
                Some(Value::Vector(current))
            }
            None => self.schema.coerce(source),
        }
    }
}

/// Handle to a typed, observable, linkable value cell.
#[derive(Clone)]
pub struct Property {
    shared: Arc<Shared>,
}

/// One end of a live link, seen from the other end.
#[derive(Debug, Clone)]
pub struct LinkInfo {
    /// The property at the other end.
    pub peer: Property,
    /// Element of the source vector carried by the link.
    pub source_index: Option<usize>,
    /// Element of the target vector written by the link.
    pub target_index: Option<usize>,
}

impl Property {
    /// Create a free-standing property not attached to any component.
    pub fn new(key: impl Into<String>, direction: Direction, schema: PropertySchema) -> Self {
        Self::with_owner(key.into(), direction, schema, None)
    }

    pub(crate) fn with_owner(
        key: String,
        direction: Direction,
        schema: PropertySchema,
        owner: Option<Owner>,
    ) -> Self {
        let state = State {
            value: schema.default.clone(),
            changed: false,
            outgoing: SmallVec::new(),
            incoming: SmallVec::new(),
        };
        Self {
            shared: Arc::new(Shared {
                id: PropertyId::new(),
                key,
                direction,
                schema,
                owner,
                state: RwLock::new(state),
            }),
        }
    }

    pub fn id(&self) -> PropertyId {
        self.shared.id
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn direction(&self) -> Direction {
        self.shared.direction
    }

    pub fn is_input(&self) -> bool {
        self.shared.direction == Direction::Input
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.shared.schema
    }

    /// The component owning this property, if attached.
    pub fn owner(&self) -> Option<ComponentId> {
        self.shared.owner.as_ref().map(|owner| owner.component)
    }

    /// `ins.key` or `outs.key`.
    pub fn path(&self) -> String {
        self.shared.path()
    }

    /// Whether both handles refer to the same cell.
    pub fn same(&self, other: &Property) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn value(&self) -> Value {
        self.shared.state.read().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.shared.state.read().value)
    }

    pub fn number(&self) -> f64 {
        self.with_value(|v| v.as_number().unwrap_or(0.0))
    }

    pub fn boolean(&self) -> bool {
        self.with_value(|v| v.as_bool().unwrap_or(false))
    }

    pub fn string(&self) -> String {
        self.with_value(|v| v.as_str().unwrap_or_default().to_string())
    }

    pub fn vector(&self) -> Vector {
        self.with_value(|v| v.as_vector().map(Vector::from_slice).unwrap_or_default())
    }

    pub fn is_changed(&self) -> bool {
        self.shared.state.read().changed
    }

    /// Whether the current value equals the schema default.
    pub fn is_default(&self) -> bool {
        self.with_value(|v| *v == self.shared.schema.default)
    }

    /// Write a value, mark the property changed and propagate the write
    /// along outgoing links.
    pub fn set_value(&self, value: impl Into<Value>) -> GraphResult<()> {
        let value = self.coerce(value.into())?;
        self.write(value);
        Ok(())
    }

    /// Write a value without raising the changed bit and without
    /// propagating it.
    pub fn set_value_silent(&self, value: impl Into<Value>) -> GraphResult<()> {
        let value = self.coerce(value.into())?;
        self.shared.state.write().value = value;
        Ok(())
    }

    /// Mark changed and propagate the current value again.
    pub fn push(&self) {
        self.write(self.value());
    }

    /// Restore the schema default.
    pub fn reset(&self) {
        self.write(self.shared.schema.default.clone());
    }

    /// Fire an event property by bumping its counter.
    pub fn trigger(&self) {
        let next = self.number() + 1.0;
        self.write(Value::Number(next));
    }

    pub fn reset_changed(&self) {
        self.shared.state.write().changed = false;
    }

    fn coerce(&self, value: Value) -> GraphResult<Value> {
        self.shared
            .schema
            .coerce(&value)
            .ok_or_else(|| GraphError::TypeMismatch {
                key: self.path(),
                expected: self.shared.schema.value_type.name(),
                actual: value.kind(),
            })
    }

    fn write(&self, value: Value) {
        let mut path = SmallVec::new();
        store(&self.shared, value, &mut path);
    }

    /// Link this property to an input property.
    ///
    /// `source_index` picks one element of a vector source, `target_index`
    /// writes into one element of a vector target. The target immediately
    /// receives the current source value.
    pub fn link_to(
        &self,
        target: &Property,
        source_index: Option<usize>,
        target_index: Option<usize>,
    ) -> GraphResult<()> {
        if self.same(target) {
            return Err(GraphError::SelfLink(self.path()));
        }
        if !target.is_input() {
            return Err(self.link_error(target, "target must be an input"));
        }
        if let Err(reason) = check_types(self.schema(), target.schema(), source_index, target_index) {
            return Err(self.link_error(target, reason));
        }

        let duplicate = target.shared.state.read().incoming.iter().any(|edge| {
            edge.peer_id == self.id()
                && edge.source_index == source_index
                && edge.target_index == target_index
        });
        if duplicate {
            return Err(GraphError::DuplicateLink(target.path()));
        }

        let outgoing = Edge {
            peer: Arc::downgrade(&target.shared),
            peer_id: target.id(),
            source_index,
            target_index,
        };
        let incoming = Edge {
            peer: Arc::downgrade(&self.shared),
            peer_id: self.id(),
            source_index,
            target_index,
        };
        self.shared.state.write().outgoing.push(outgoing.clone());
        target.shared.state.write().incoming.push(incoming);

        self.shared.request_sort();
        target.shared.request_sort();
        tracing::debug!(from = %self.path(), to = %target.path(), "linked properties");

        let value = self.value();
        if let Some(received) = target.shared.transfer(&value, &outgoing) {
            let mut path = SmallVec::new();
            path.push(self.id());
            store(&target.shared, received, &mut path);
        }
        Ok(())
    }

    fn link_error(&self, target: &Property, reason: &'static str) -> GraphError {
        GraphError::IncompatibleLink {
            from: self.path(),
            to: target.path(),
            reason,
        }
    }

    /// Remove every link from this property to `target`.
    pub fn unlink(&self, target: &Property) -> bool {
        let removed = {
            let mut state = self.shared.state.write();
            let before = state.outgoing.len();
            state.outgoing.retain(|edge| edge.peer_id != target.id());
            state.outgoing.len() != before
        };
        if removed {
            let id = self.id();
            target.shared.state.write().incoming.retain(|edge| edge.peer_id != id);
            self.shared.request_sort();
            target.shared.request_sort();
            tracing::debug!(from = %self.path(), to = %target.path(), "unlinked properties");
        }
        removed
    }

    /// Remove all incoming and outgoing links.
    pub fn unlink_all(&self) {
        let (outgoing, incoming) = {
            let mut state = self.shared.state.write();
            (
                std::mem::take(&mut state.outgoing),
                std::mem::take(&mut state.incoming),
            )
        };
        if outgoing.is_empty() && incoming.is_empty() {
            return;
        }

        let id = self.id();
        for edge in &outgoing {
            if let Some(peer) = edge.peer.upgrade() {
                peer.state.write().incoming.retain(|e| e.peer_id != id);
                peer.request_sort();
            }
        }
        for edge in &incoming {
            if let Some(peer) = edge.peer.upgrade() {
                peer.state.write().outgoing.retain(|e| e.peer_id != id);
                peer.request_sort();
            }
        }
        self.shared.request_sort();
    }

    pub fn has_incoming(&self) -> bool {
        !self.shared.state.read().incoming.is_empty()
    }

    pub fn has_outgoing(&self) -> bool {
        !self.shared.state.read().outgoing.is_empty()
    }

    /// Live incoming links; `peer` is the source.
    pub fn incoming(&self) -> Vec<LinkInfo> {
        collect_links(&self.shared.state.read().incoming)
    }

    /// Live outgoing links; `peer` is the target.
    pub fn outgoing(&self) -> Vec<LinkInfo> {
        collect_links(&self.shared.state.read().outgoing)
    }

    /// Components owning the sources of incoming links.
    pub(crate) fn source_owners(&self) -> SmallVec<[ComponentId; 2]> {
        self.shared
            .state
            .read()
            .incoming
            .iter()
            .filter_map(|edge| edge.peer.upgrade())
            .filter_map(|peer| peer.owner.as_ref().map(|owner| owner.component))
            .collect()
    }
}

fn store(shared: &Arc<Shared>, value: Value, path: &mut SmallVec<[PropertyId; 8]>) {
    let outgoing = {
        let mut state = shared.state.write();
        state.changed = true;
        state.value = value.clone();
        state.outgoing.clone()
    };
    shared.mark_owner_changed();
    if outgoing.is_empty() {
        return;
    }

    path.push(shared.id);
    for edge in &outgoing {
        if path.contains(&edge.peer_id) {
            continue;
        }
        let Some(target) = edge.peer.upgrade() else {
            continue;
        };
        match target.transfer(&value, edge) {
            Some(received) => store(&target, received, path),
            None => tracing::trace!(from = %shared.path(), to = %target.path(), "value not transferable"),
        }
    }
    path.pop();
}

fn collect_links(edges: &[Edge]) -> Vec<LinkInfo> {
    edges
        .iter()
        .filter_map(|edge| {
            edge.peer.upgrade().map(|shared| LinkInfo {
                peer: Property { shared },
                source_index: edge.source_index,
                target_index: edge.target_index,
            })
        })
        .collect()
}

fn check_types(
    source: &PropertySchema,
    target: &PropertySchema,
    source_index: Option<usize>,
    target_index: Option<usize>,
) -> Result<(), &'static str> {
    let source_type = match (source_index, source.value_type) {
        (None, value_type) => value_type,
        (Some(i), ValueType::Vector(len)) if len == 0 || i < len => ValueType::Number,
        (Some(_), _) => return Err("source index out of range or source is not a vector"),
    };
    let target_type = match (target_index, target.value_type) {
        (None, value_type) => value_type,
        (Some(j), ValueType::Vector(len)) if len == 0 || j < len => ValueType::Number,
        (Some(_), _) => return Err("target index out of range or target is not a vector"),
    };
    if source_type.can_feed(&target_type) {
        Ok(())
    } else {
        Err("incompatible value types")
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Property")
            .field("path", &self.shared.path())
            .field("value", &state.value)
            .field("changed", &state.changed)
            .field("incoming", &state.incoming.len())
            .field("outgoing", &state.outgoing.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(key: &str, schema: PropertySchema) -> Property {
        Property::new(key, Direction::Input, schema)
    }

    fn output(key: &str, schema: PropertySchema) -> Property {
        Property::new(key, Direction::Output, schema)
    }

    #[test]
    fn set_value_marks_changed() {
        let p = input("x", PropertySchema::number(0.0));
        assert!(!p.is_changed());

        p.set_value(2.0).unwrap();
        assert!(p.is_changed());
        assert_eq!(p.number(), 2.0);

        p.reset_changed();
        assert!(!p.is_changed());
    }

    #[test]
    fn silent_write_keeps_changed_clear() {
        let p = input("x", PropertySchema::number(0.0));
        p.set_value_silent(5.0).unwrap();
        assert_eq!(p.number(), 5.0);
        assert!(!p.is_changed());
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let p = input("x", PropertySchema::number(0.0));
        let err = p.set_value("text").unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
        assert_eq!(p.number(), 0.0);
    }

    #[test]
    fn link_pushes_current_and_future_values() {
        let source = output("value", PropertySchema::number(3.0));
        let target = input("value", PropertySchema::number(0.0));

        source.link_to(&target, None, None).unwrap();
        assert_eq!(target.number(), 3.0);
        assert!(target.is_changed());

        target.reset_changed();
        source.set_value(7.0).unwrap();
        assert_eq!(target.number(), 7.0);
        assert!(target.is_changed());
    }

    #[test]
    fn propagation_is_transitive_through_inputs() {
        let source = output("a", PropertySchema::number(0.0));
        let middle = input("b", PropertySchema::number(0.0));
        let last = input("c", PropertySchema::number(0.0));

        source.link_to(&middle, None, None).unwrap();
        middle.link_to(&last, None, None).unwrap();

        source.set_value(4.0).unwrap();
        assert_eq!(middle.number(), 4.0);
        assert_eq!(last.number(), 4.0);
    }

    #[test]
    fn input_cycles_terminate() {
        let a = input("a", PropertySchema::number(0.0));
        let b = input("b", PropertySchema::number(0.0));

        a.link_to(&b, None, None).unwrap();
        b.link_to(&a, None, None).unwrap();

        a.set_value(1.0).unwrap();
        assert_eq!(b.number(), 1.0);
        assert_eq!(a.number(), 1.0);
    }

    #[test]
    fn numbers_feed_booleans() {
        let source = output("n", PropertySchema::number(0.0));
        let target = input("flag", PropertySchema::boolean(false));
        source.link_to(&target, None, None).unwrap();

        source.set_value(1.0).unwrap();
        assert!(target.boolean());
    }

    #[test]
    fn incompatible_types_cannot_link() {
        let source = output("s", PropertySchema::string(""));
        let target = input("n", PropertySchema::number(0.0));
        let err = source.link_to(&target, None, None).unwrap_err();
        assert!(matches!(err, GraphError::IncompatibleLink { .. }));
    }

    #[test]
    fn only_inputs_are_link_targets() {
        let a = output("a", PropertySchema::number(0.0));
        let b = output("b", PropertySchema::number(0.0));
        assert!(a.link_to(&b, None, None).is_err());
        assert!(matches!(a.link_to(&a, None, None), Err(GraphError::SelfLink(_))));
    }

    #[test]
    fn inputs_accept_fan_in() {
        let a = output("a", PropertySchema::number(0.0));
        let b = output("b", PropertySchema::number(0.0));
        let target = input("t", PropertySchema::number(0.0));

        a.link_to(&target, None, None).unwrap();
        b.link_to(&target, None, None).unwrap();
        assert_eq!(target.incoming().len(), 2);

        a.set_value(1.0).unwrap();
        assert_eq!(target.number(), 1.0);
        b.set_value(2.0).unwrap();
        assert_eq!(target.number(), 2.0);

        let err = a.link_to(&target, None, None).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateLink(_)));
        assert!(a.link_to(&target, None, Some(0)).is_err());
    }

    #[test]
    fn vector_elements_link_individually() {
        let position = output("position", PropertySchema::vector(&[1.0, 2.0, 3.0]));
        let height = input("height", PropertySchema::number(0.0));
        let target = input("target", PropertySchema::vector(&[0.0, 0.0, 0.0]));
        let x = output("x", PropertySchema::number(9.0));

        position.link_to(&height, Some(1), None).unwrap();
        assert_eq!(height.number(), 2.0);

        x.link_to(&target, None, Some(0)).unwrap();
        position.link_to(&target, Some(2), Some(2)).unwrap();
        assert_eq!(target.vector().as_slice(), &[9.0, 0.0, 3.0]);

        assert!(position.link_to(&height, Some(5), None).is_err());
    }

    #[test]
    fn unlink_stops_propagation() {
        let source = output("v", PropertySchema::number(0.0));
        let target = input("v", PropertySchema::number(0.0));
        source.link_to(&target, None, None).unwrap();

        assert!(source.unlink(&target));
        assert!(!source.unlink(&target));
        assert!(!target.has_incoming());

        source.set_value(3.0).unwrap();
        assert_eq!(target.number(), 0.0);
    }

    #[test]
    fn unlink_all_clears_both_directions() {
        let a = output("a", PropertySchema::number(0.0));
        let b = input("b", PropertySchema::number(0.0));
        let c = input("c", PropertySchema::number(0.0));
        a.link_to(&b, None, None).unwrap();
        b.link_to(&c, None, None).unwrap();

        b.unlink_all();
        assert!(!a.has_outgoing());
        assert!(!c.has_incoming());
        assert!(b.incoming().is_empty());
        assert!(b.outgoing().is_empty());
    }

    #[test]
    fn event_trigger_counts_up() {
        let e = input("fire", PropertySchema::event());
        e.trigger();
        e.trigger();
        assert_eq!(e.number(), 2.0);
        assert!(e.is_changed());
    }
}
