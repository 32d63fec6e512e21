//! JSON documents for graphs, nodes and components.
//!
//! Loading runs in two passes. The first creates every node and component
//! with its original id and restores property values silently. The second
//! reconnects property links and lets behaviors resolve their references,
//! once every object of the document exists. A link or reference whose
//! target is missing is skipped with a warning, or fails the load when
//! `strict_references` is configured.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::ids::{ComponentId, GraphId, NodeId};
use crate::node::LockState;
use crate::property::PropertyGroup;
use crate::pulse::UpdateContext;
use crate::system::System;

/// Serialized graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

/// Serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Unlocked after having been locked, so it can't be locked again.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub released: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
}

/// Serialized component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: ComponentId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub ins: IndexMap<String, PropertyDocument>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outs: IndexMap<String, PropertyDocument>,
    /// Behavior state, see [`Behavior::save`](crate::Behavior::save).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Serialized property. Only written when the value differs from the
/// default or the property has incoming links.
///
/// The value is kept as plain JSON and read back through the property's
/// schema, so an object property holding an array or a number keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkDocument>,
}

/// Incoming link, stored on its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDocument {
    /// Component owning the source property.
    pub id: ComponentId,
    /// Source property path, `outs.key` or `ins.key`.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<usize>,
}

/// A loaded component waiting for the reference pass.
#[derive(Debug)]
pub(crate) struct PendingComponent {
    id: ComponentId,
    document: ComponentDocument,
}

// An explicit `null` is a value, only a missing field means "default".
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

fn group_to_document(group: &PropertyGroup) -> GraphResult<IndexMap<String, PropertyDocument>> {
    let mut documents = IndexMap::new();
    for property in group.iter() {
        let value = if property.is_default() {
            None
        } else {
            Some(serde_json::to_value(property.value())?)
        };
        let links: Vec<LinkDocument> = property
            .incoming()
            .into_iter()
            .filter_map(|link| {
                Some(LinkDocument {
                    id: link.peer.owner()?,
                    key: link.peer.path(),
                    source_index: link.source_index,
                    target_index: link.target_index,
                })
            })
            .collect();

        if value.is_some() || !links.is_empty() {
            documents.insert(property.key().to_string(), PropertyDocument { value, links });
        }
    }
    Ok(documents)
}

fn restore_values(
    group: &PropertyGroup,
    documents: &IndexMap<String, PropertyDocument>,
) -> GraphResult<()> {
    for (key, document) in documents {
        let Some(value) = &document.value else {
            continue;
        };
        match group.get(key) {
            Some(property) => {
                let value = property.schema().value_from_json(value)?;
                property.set_value_silent(value)?;
            }
            None => tracing::warn!(
                key = %key,
                group = group.direction().group_name(),
                "ignoring value of unknown property"
            ),
        }
    }
    Ok(())
}

impl System {
    pub fn graph_to_document(&self, graph: GraphId) -> GraphResult<GraphDocument> {
        let nodes = self
            .graph(graph)?
            .nodes()
            .map(|node| self.node_to_document(node))
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(GraphDocument { nodes })
    }

    /// Serialize a node and the components its type persists.
    pub fn node_to_document(&self, id: NodeId) -> GraphResult<NodeDocument> {
        let node = self.node(id)?;
        let mut components = Vec::new();
        for component in node.components() {
            if node.persists(self.component(component)?) {
                components.push(self.component_to_document(component)?);
            }
        }

        Ok(NodeDocument {
            type_name: node.type_name().to_string(),
            id,
            name: node.name().to_string(),
            locked: node.lock_state().as_flag(),
            released: node.lock_state() == LockState::Released,
            tags: node.tags().map(str::to_string).collect(),
            components,
        })
    }

    pub fn component_to_document(&self, id: ComponentId) -> GraphResult<ComponentDocument> {
        let component = self.component(id)?;
        let data = match component.behavior.as_deref() {
            Some(behavior) => behavior.save(self)?,
            None => None,
        };

        Ok(ComponentDocument {
            type_name: component.type_name().to_string(),
            id,
            name: component.name().to_string(),
            tags: component.tags().map(str::to_string).collect(),
            ins: group_to_document(component.ins())?,
            outs: group_to_document(component.outs())?,
            data,
        })
    }

    pub fn graph_to_json(&self, graph: GraphId) -> GraphResult<serde_json::Value> {
        Ok(serde_json::to_value(self.graph_to_document(graph)?)?)
    }

    /// Serialize the root graph.
    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.graph_to_document(self.root())?)?)
    }

    /// Load a document into the root graph.
    pub fn load_json(&mut self, json: &str) -> GraphResult<()> {
        self.graph_from_json(self.root(), json)
    }

    pub fn graph_from_json(&mut self, graph: GraphId, json: &str) -> GraphResult<()> {
        let document: GraphDocument = serde_json::from_str(json)?;
        self.load_graph_document(graph, &document)
    }

    /// Both loading passes.
    pub fn load_graph_document(&mut self, graph: GraphId, document: &GraphDocument) -> GraphResult<()> {
        let start = self.pending.len();
        if let Err(err) = self.graph_nodes_from_document(graph, document) {
            self.pending.truncate(start);
            return Err(err);
        }
        let pending = self.pending.split_off(start);
        self.resolve_pending(&pending)
    }

    /// First loading pass only. Links and references are resolved by the
    /// enclosing [`load_graph_document`](Self::load_graph_document); nested
    /// graphs use this from their component's `load` hook.
    pub fn graph_nodes_from_document(&mut self, graph: GraphId, document: &GraphDocument) -> GraphResult<()> {
        for node in &document.nodes {
            self.node_from_document(graph, node)?;
        }
        Ok(())
    }

    fn node_from_document(&mut self, graph: GraphId, document: &NodeDocument) -> GraphResult<NodeId> {
        let id = self.insert_node(graph, &document.type_name, document.id, document.name.clone())?;
        for tag in &document.tags {
            self.add_node_tag(id, tag)?;
        }
        for component in &document.components {
            self.component_from_document(id, component)?;
        }
        match (document.locked, document.released) {
            (Some(true), _) => self.lock_node(id)?,
            (_, true) => {
                self.lock_node(id)?;
                self.unlock_node(id)?;
            }
            (Some(false), false) => self.unlock_node(id)?,
            (None, false) => {}
        }
        Ok(id)
    }

    fn component_from_document(&mut self, node: NodeId, document: &ComponentDocument) -> GraphResult<ComponentId> {
        let id = self.create_component_with_id(node, &document.type_name, document.id)?;
        if !document.name.is_empty() {
            self.set_component_name(id, document.name.clone())?;
        }
        for tag in &document.tags {
            self.add_component_tag(id, tag)?;
        }

        let component = self.component(id)?;
        restore_values(component.ins(), &document.ins)?;
        restore_values(component.outs(), &document.outs)?;

        if let Some(data) = &document.data {
            self.invoke(id, UpdateContext::default(), |behavior, cx| behavior.load(data, cx))?;
        }

        let has_links = document.ins.values().any(|property| !property.links.is_empty());
        if has_links || document.data.is_some() {
            self.pending.push(PendingComponent {
                id,
                document: document.clone(),
            });
        }
        Ok(id)
    }

    fn resolve_pending(&mut self, pending: &[PendingComponent]) -> GraphResult<()> {
        for entry in pending {
            self.resolve_links(entry)?;
        }
        for entry in pending {
            if let Some(data) = &entry.document.data {
                self.invoke(entry.id, UpdateContext::default(), |behavior, cx| {
                    behavior.resolve_references(data, cx)
                })?;
            }
        }
        Ok(())
    }

    fn resolve_links(&self, entry: &PendingComponent) -> GraphResult<()> {
        let Some(component) = self.find_component(entry.id) else {
            return Ok(());
        };

        for (key, document) in &entry.document.ins {
            let Some(target) = component.ins().get(key) else {
                self.unresolved(format!("input '{}' on component {}", key, entry.id))?;
                continue;
            };
            for link in &document.links {
                let source = self
                    .find_component(link.id)
                    .and_then(|source| source.property(&link.key).ok());
                match source {
                    Some(source) => source.link_to(target, link.source_index, link.target_index)?,
                    None => self.unresolved(format!("link source {} '{}'", link.id, link.key))?,
                }
            }
        }
        Ok(())
    }

    fn unresolved(&self, what: String) -> GraphResult<()> {
        if self.config.strict_references {
            return Err(GraphError::UnresolvedReference(what));
        }
        tracing::warn!(reference = %what, "unresolved reference skipped");
        Ok(())
    }
}
