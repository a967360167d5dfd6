//! Serde helpers for graph types.

use serde::{Serialize, Serializer};

use crate::DependencyEdge;

/// Serialize dependency edges as a flat list of target ids, keeping first occurrence order.
pub fn serialize_depends_on<S>(edges: &[DependencyEdge], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut targets: Vec<&str> = Vec::with_capacity(edges.len());
    for edge in edges {
        if !targets.contains(&edge.target.as_str()) {
            targets.push(&edge.target);
        }
    }
    targets.serialize(serializer)
}

/// Used with `skip_serializing_if` for dependency lists.
pub fn is_empty(edges: &[DependencyEdge]) -> bool {
    edges.is_empty()
}
