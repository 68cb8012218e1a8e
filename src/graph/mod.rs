//! Traversal graph: the permission-filtered view of the entity types.
//!
//! Provides the graph data model, the builder that derives it from type
//! metadata and a permission policy, and read-only lookups over it.

pub mod builder;
pub mod engine;
pub mod query;
pub mod types;

pub use builder::build_graph;
pub use engine::TraversalGraph;
pub use types::{
    EdgeData, EdgeKind, GraphDescription, GraphStats, NodeData, NodeDescription, NodeKind,
    LEAF_NODE,
};
