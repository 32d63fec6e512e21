//! Component and node kinds, and the registry that constructs them by name.
//!
//! Component types form a single-inheritance hierarchy by name: each kind
//! may name a registered parent, and the full ancestor chain is resolved once
//! at registration time. `Component::is` and every type index then match on
//! that chain instead of walking anything at runtime.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::component::{Behavior, Component};
use crate::error::{GraphError, GraphResult};
use crate::ids::NodeId;
use crate::property::PropertyGroup;
use crate::system::System;

/// Lifecycle hooks a component kind participates in.
///
/// Hooks a kind doesn't declare are never called, so the scheduler skips
/// components that have nothing to do in a given phase. `create` and
/// `dispose` are always called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hooks(u8);

impl Hooks {
    pub const NONE: Hooks = Hooks(0);
    pub const ACTIVATE: Hooks = Hooks(1);
    pub const DEACTIVATE: Hooks = Hooks(1 << 1);
    pub const UPDATE: Hooks = Hooks(1 << 2);
    pub const TICK: Hooks = Hooks(1 << 3);
    pub const TOCK: Hooks = Hooks(1 << 4);

    pub const fn union(self, other: Hooks) -> Hooks {
        Hooks(self.0 | other.0)
    }

    pub const fn contains(self, other: Hooks) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Hooks {
    type Output = Hooks;

    fn bitor(self, rhs: Hooks) -> Hooks {
        self.union(rhs)
    }
}

/// Scope in which at most one instance of a component type may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Singleton {
    /// Any number of instances.
    None,
    /// At most one per node.
    #[default]
    Node,
    /// At most one per graph.
    Graph,
    /// At most one in the whole system.
    System,
}

/// A statically declared component type.
///
/// ```
/// use trellis_core::{Behavior, ComponentContext, ComponentKind, GraphResult, Hooks, PropertyGroup, PropertySchema};
///
/// #[derive(Default)]
/// struct Doubler;
///
/// impl Behavior for Doubler {
///     fn update(&mut self, cx: &mut ComponentContext<'_>) -> GraphResult<bool> {
///         let input = cx.ins.property("value")?.number();
///         cx.outs.set_value("value", input * 2.0)?;
///         Ok(true)
///     }
/// }
///
/// impl ComponentKind for Doubler {
///     const TYPE_NAME: &'static str = "Doubler";
///     const HOOKS: Hooks = Hooks::UPDATE;
///
///     fn declare_ins(ins: &mut PropertyGroup) -> GraphResult<()> {
///         ins.add("value", PropertySchema::number(0.0))?;
///         Ok(())
///     }
///
///     fn declare_outs(outs: &mut PropertyGroup) -> GraphResult<()> {
///         outs.add("value", PropertySchema::number(0.0))?;
///         Ok(())
///     }
/// }
/// ```
pub trait ComponentKind: Behavior + Default {
    /// Unique registered name.
    const TYPE_NAME: &'static str;
    /// Registered name of the parent kind. Properties aren't inherited;
    /// call the parent's `declare_*` functions explicitly.
    const PARENT: Option<&'static str> = None;
    const SINGLETON: Singleton = Singleton::Node;
    const HOOKS: Hooks = Hooks::NONE;

    fn declare_ins(_ins: &mut PropertyGroup) -> GraphResult<()> {
        Ok(())
    }

    fn declare_outs(_outs: &mut PropertyGroup) -> GraphResult<()> {
        Ok(())
    }
}

/// A statically declared node type.
pub trait NodeKind: 'static {
    const TYPE_NAME: &'static str;

    /// Populate a freshly created node. Not called when the node is restored
    /// from a document, since its components are restored with it.
    fn create_components(_system: &mut System, _node: NodeId) -> GraphResult<()> {
        Ok(())
    }

    /// Whether a component is written out when the node is serialized.
    fn persists(_component: &Component) -> bool {
        true
    }
}

/// The plain node type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseNode;

impl NodeKind for BaseNode {
    const TYPE_NAME: &'static str = "Node";
}

/// Registered component type.
pub struct ComponentDescriptor {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    /// This type's name followed by every ancestor's, nearest first.
    pub ancestors: Vec<&'static str>,
    pub singleton: Singleton,
    pub hooks: Hooks,
    pub(crate) factory: fn() -> Box<dyn Behavior>,
    pub(crate) declare_ins: fn(&mut PropertyGroup) -> GraphResult<()>,
    pub(crate) declare_outs: fn(&mut PropertyGroup) -> GraphResult<()>,
}

impl ComponentDescriptor {
    /// Whether this type is `type_name` or derives from it.
    pub fn is(&self, type_name: &str) -> bool {
        self.ancestors.iter().any(|name| *name == type_name)
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("singleton", &self.singleton)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Registered node type.
#[derive(Debug)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub(crate) create_components: fn(&mut System, NodeId) -> GraphResult<()>,
    pub(crate) persists: fn(&Component) -> bool,
}

/// Name to constructor tables for component and node kinds.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    components: IndexMap<&'static str, Arc<ComponentDescriptor>>,
    nodes: IndexMap<&'static str, Arc<NodeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component kind. The parent kind, if any, must already be
    /// registered. Registering the same kind twice is a no-op.
    pub fn register_component<T: ComponentKind>(&mut self) -> GraphResult<()> {
        if self.components.contains_key(T::TYPE_NAME) {
            return Ok(());
        }

        let mut ancestors = vec![T::TYPE_NAME];
        if let Some(parent) = T::PARENT {
            let parent = self
                .components
                .get(parent)
                .ok_or_else(|| GraphError::UnknownComponentType(parent.to_string()))?;
            ancestors.extend(parent.ancestors.iter().copied());
        }

        let descriptor = ComponentDescriptor {
            name: T::TYPE_NAME,
            parent: T::PARENT,
            ancestors,
            singleton: T::SINGLETON,
            hooks: T::HOOKS,
            factory: || -> Box<dyn Behavior> { Box::new(T::default()) },
            declare_ins: T::declare_ins,
            declare_outs: T::declare_outs,
        };
        tracing::debug!(type_name = T::TYPE_NAME, "registered component type");
        self.components.insert(T::TYPE_NAME, Arc::new(descriptor));
        Ok(())
    }

    pub fn register_node<T: NodeKind>(&mut self) {
        self.nodes.entry(T::TYPE_NAME).or_insert_with(|| {
            Arc::new(NodeDescriptor {
                name: T::TYPE_NAME,
                create_components: T::create_components,
                persists: T::persists,
            })
        });
    }

    pub fn component(&self, type_name: &str) -> GraphResult<Arc<ComponentDescriptor>> {
        self.components
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownComponentType(type_name.to_string()))
    }

    pub fn node(&self, type_name: &str) -> GraphResult<Arc<NodeDescriptor>> {
        self.nodes
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownNodeType(type_name.to_string()))
    }

    pub fn has_component(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    pub fn has_node(&self, type_name: &str) -> bool {
        self.nodes.contains_key(type_name)
    }

    /// Registered component type names in registration order.
    pub fn component_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.keys().copied()
    }

    pub fn node_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }
}
