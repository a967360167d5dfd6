//! Resolved resource graph.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{Value, serde_helpers};

/// Template metadata carried into the resolved graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMeta {
    /// Template name.
    pub name: String,
    /// Template version.
    pub version: String,
    /// Description, if the template has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How a dependency edge came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Declared in `depends_on`.
    Explicit,
    /// The target is this node's parent resource.
    Parent,
    /// This node reads a property of the target.
    Reference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Explicit => "explicit",
            EdgeKind::Parent => "parent",
            EdgeKind::Reference => "reference",
        }
    }
}

/// An ordering constraint: the owning node is created after `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    /// Id of the node that must exist first.
    pub target: String,
    /// Why the edge exists.
    pub kind: EdgeKind,
}

impl DependencyEdge {
    pub fn new(target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// One concrete resource in the resolved graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    /// Unique node id: the symbolic name, plus `[i]` for for-each instances.
    pub id: String,
    /// Symbolic name of the declaration this node came from.
    #[serde(skip)]
    pub symbol: String,
    /// Position in the for-each array, if any.
    #[serde(skip)]
    pub index: Option<usize>,
    /// Resource type, e.g. `Microsoft.Storage/storageAccounts`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// API version of the resource type.
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// Fully qualified name (`parent/child` for child resources).
    pub name: String,
    /// Remaining top-level fields (`location`, `sku`, `properties`, ...).
    #[serde(flatten)]
    pub body: IndexMap<String, Value>,
    /// Nodes that must be created before this one.
    #[serde(
        rename = "dependsOn",
        serialize_with = "serde_helpers::serialize_depends_on",
        skip_serializing_if = "serde_helpers::is_empty"
    )]
    pub depends_on: Vec<DependencyEdge>,
}

impl ResourceNode {
    /// Returns true if this node depends on `target` by any kind of edge.
    pub fn depends_on(&self, target: &str) -> bool {
        self.depends_on.iter().any(|e| e.target == target)
    }

    /// Look up a nested property by dotted path, e.g. `properties.osType`.
    pub fn property(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.body.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// The resolved graph of resource nodes, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGraph {
    /// Template metadata.
    pub template: TemplateMeta,
    /// Included resource nodes.
    pub resources: Vec<ResourceNode>,
    /// Symbolic names of declarations whose condition was false.
    #[serde(skip)]
    pub excluded: Vec<String>,
}

impl ResourceGraph {
    /// Number of included nodes.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.resources.iter().find(|n| n.id == id)
    }

    /// All nodes expanded from the given declaration, in order.
    pub fn instances_of<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a ResourceNode> {
        self.resources.iter().filter(move |n| n.symbol == symbol)
    }

    /// All nodes of the given resource type, in order.
    pub fn nodes_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a ResourceNode> {
        self.resources
            .iter()
            .filter(move |n| n.resource_type.eq_ignore_ascii_case(resource_type))
    }

    /// Returns true if the declaration was left out by its condition.
    pub fn is_excluded(&self, symbol: &str) -> bool {
        self.excluded.iter().any(|s| s == symbol)
    }

    /// Returns true if any node holds a secure value.
    pub fn contains_secure(&self) -> bool {
        self.resources
            .iter()
            .any(|n| n.body.values().any(Value::contains_secure))
    }
}
