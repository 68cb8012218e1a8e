//
//  query.rs
//  Trellis
//
//  Created by hak (tharun)
//

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::engine::TraversalGraph;
use super::types::*;

impl TraversalGraph {
    /// Whether the type has a node.
    pub fn has_node(&self, type_name: &str) -> bool {
        self.type_index.contains_key(type_name)
    }

    /// Node for a type identifier.
    pub fn node(&self, type_name: &str) -> Option<&NodeData> {
        self.index_of(type_name).map(|idx| &self.graph[idx])
    }

    /// Node exposed under a path.
    pub fn node_by_path(&self, path: &str) -> Option<&NodeData> {
        self.path_index.get(path).map(|&idx| &self.graph[idx])
    }

    /// The shared leaf node.
    pub fn leaf(&self) -> &NodeData {
        &self.graph[self.leaf]
    }

    /// The edge a type has for a field, if any. There is at most one.
    pub fn find_edge(&self, type_name: &str, field: &str) -> Option<&EdgeData> {
        let idx = self.index_of(type_name)?;
        self.edge_index
            .get(&(idx, field.to_string()))
            .map(|&e| &self.graph[e])
    }

    /// Outgoing edges of a type, in field declaration order.
    pub fn outgoing(&self, type_name: &str) -> Vec<&EdgeData> {
        let Some(idx) = self.index_of(type_name) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest first
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, w)| w).collect()
    }

    /// Entity nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph
            .node_indices()
            .filter(move |&idx| idx != self.leaf)
            .map(move |idx| &self.graph[idx])
    }

    /// Node and edge counts.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.graph.node_count() - 1,
            ..Default::default()
        };
        for edge in self.graph.edge_weights() {
            match edge.kind {
                EdgeKind::Value => stats.value_edges += 1,
                EdgeKind::Relation => stats.relation_edges += 1,
                EdgeKind::Collection => stats.collection_edges += 1,
            }
        }
        stats
    }

    /// Serializable snapshot of every entity node with its edges.
    pub fn describe(&self) -> GraphDescription {
        GraphDescription {
            nodes: self
                .nodes()
                .map(|node| NodeDescription {
                    type_name: node.type_name.clone(),
                    name: node.display_name.clone(),
                    path: node.path.clone(),
                    edges: self
                        .outgoing(&node.type_name)
                        .into_iter()
                        .cloned()
                        .collect(),
                })
                .collect(),
        }
    }
}
