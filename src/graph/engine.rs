//
//  engine.rs
//  Trellis
//
//  Created by hak (tharun)
//

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;

use super::types::*;

/// The traversal graph: exposed entity types and their field projections.
///
/// Nodes are entity types plus one shared leaf node; every edge runs from an
/// entity node to the leaf and carries the field it projects. The graph is
/// only mutated while [`build_graph`](super::build_graph) runs, after which it
/// is read-only and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TraversalGraph {
    /// The directed graph storing nodes and field edges.
    pub(crate) graph: DiGraph<NodeData, EdgeData>,
    /// The shared leaf node.
    pub(crate) leaf: NodeIndex,
    /// Index: type identifier -> node index.
    pub(crate) type_index: HashMap<String, NodeIndex>,
    /// Index: path -> node index.
    pub(crate) path_index: HashMap<String, NodeIndex>,
    /// Index: (node, field name) -> edge index.
    pub(crate) edge_index: HashMap<(NodeIndex, String), EdgeIndex>,
}

impl TraversalGraph {
    /// Create a graph holding only the leaf node.
    pub(crate) fn new() -> Self {
        let mut graph = DiGraph::new();
        let leaf = graph.add_node(NodeData::new_leaf());
        Self {
            graph,
            leaf,
            type_index: HashMap::new(),
            path_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Add an entity node. Returns the existing index if the type is already present.
    pub(crate) fn add_entity(&mut self, data: NodeData) -> NodeIndex {
        if let Some(&idx) = self.type_index.get(&data.type_name) {
            return idx;
        }
        let type_name = data.type_name.clone();
        let path = data.path.clone();
        let idx = self.graph.add_node(data);
        self.type_index.insert(type_name, idx);
        self.path_index.entry(path).or_insert(idx);
        idx
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Add a field edge from an entity node to the leaf.
    ///
    /// Returns `false` and leaves the graph untouched when the node already
    /// has an edge for that field.
    pub(crate) fn add_field_edge(&mut self, from: NodeIndex, data: EdgeData) -> bool {
        let key = (from, data.field.clone());
        if self.edge_index.contains_key(&key) {
            return false;
        }
        let idx = self.graph.add_edge(from, self.leaf, data);
        self.edge_index.insert(key, idx);
        true
    }

    // ─── Internal Helpers ───────────────────────────────────────

    pub(crate) fn index_of(&self, type_name: &str) -> Option<NodeIndex> {
        self.type_index.get(type_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author_node() -> NodeData {
        NodeData::new_entity(
            "app::Author".to_string(),
            "author".to_string(),
            "author".to_string(),
        )
    }

    #[test]
    fn test_empty_graph_has_only_leaf() {
        let graph = TraversalGraph::new();
        let stats = graph.stats();
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.total_edges(), 0);
        assert_eq!(graph.leaf().type_name, LEAF_NODE);
        assert!(!graph.has_node(LEAF_NODE));
    }

    #[test]
    fn test_add_entity_is_idempotent() {
        let mut graph = TraversalGraph::new();
        let a = graph.add_entity(author_node());
        let b = graph.add_entity(author_node());
        assert_eq!(a, b);
        assert_eq!(graph.stats().nodes, 1);
    }

    #[test]
    fn test_duplicate_field_edge_is_refused() {
        let mut graph = TraversalGraph::new();
        let idx = graph.add_entity(author_node());
        assert!(graph.add_field_edge(idx, EdgeData::value("name")));
        assert!(!graph.add_field_edge(idx, EdgeData::relation("name", "app::Other")));

        let edges = graph.outgoing("app::Author");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Value);
    }

    #[test]
    fn test_edges_point_at_leaf() {
        let mut graph = TraversalGraph::new();
        let idx = graph.add_entity(author_node());
        graph.add_field_edge(idx, EdgeData::value("name"));
        let edge = graph.graph.edge_indices().next().unwrap();
        let (from, to) = graph.graph.edge_endpoints(edge).unwrap();
        assert_eq!(from, idx);
        assert_eq!(to, graph.leaf);
    }
}
