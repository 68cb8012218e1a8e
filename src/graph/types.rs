//
//  types.rs
//  Trellis
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type identifier of the shared leaf node.
pub const LEAF_NODE: &str = "value";

/// What a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// An exposed entity type.
    Entity,
    /// The shared "store the value directly" node.
    Leaf,
}

/// How a field relates to other entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Plain value, stored as-is.
    Value,
    /// A single related entity.
    Relation,
    /// A collection whose elements are related entities.
    Collection,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Value => "value",
            EdgeKind::Relation => "relation",
            EdgeKind::Collection => "collection",
        };
        write!(f, "{}", s)
    }
}

/// Data stored on each graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Fully qualified type identifier, the node's key.
    pub type_name: String,
    /// Human-facing name.
    pub display_name: String,
    /// Path segment the type is exposed under.
    pub path: String,
}

impl NodeData {
    pub fn new_entity(type_name: String, display_name: String, path: String) -> Self {
        Self {
            kind: NodeKind::Entity,
            type_name,
            display_name,
            path,
        }
    }

    pub fn new_leaf() -> Self {
        Self {
            kind: NodeKind::Leaf,
            type_name: LEAF_NODE.to_string(),
            display_name: LEAF_NODE.to_string(),
            path: LEAF_NODE.to_string(),
        }
    }
}

/// Data stored on each graph edge: one field's projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub field: String,
    /// Related entity type; present only on relation and collection edges.
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub target_class: Option<String>,
    pub kind: EdgeKind,
}

impl EdgeData {
    pub fn value(field: &str) -> Self {
        Self {
            field: field.to_string(),
            target_class: None,
            kind: EdgeKind::Value,
        }
    }

    pub fn relation(field: &str, target_class: &str) -> Self {
        Self {
            field: field.to_string(),
            target_class: Some(target_class.to_string()),
            kind: EdgeKind::Relation,
        }
    }

    pub fn collection(field: &str, target_class: &str) -> Self {
        Self {
            field: field.to_string(),
            target_class: Some(target_class.to_string()),
            kind: EdgeKind::Collection,
        }
    }
}

/// Counts for a built graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Entity nodes (the leaf node is not counted).
    pub nodes: usize,
    pub value_edges: usize,
    pub relation_edges: usize,
    pub collection_edges: usize,
}

impl GraphStats {
    pub fn total_edges(&self) -> usize {
        self.value_edges + self.relation_edges + self.collection_edges
    }
}

/// Serializable snapshot of a graph, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub path: String,
    pub edges: Vec<EdgeData>,
}
