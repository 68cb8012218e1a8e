//
//  builder.rs
//  Trellis
//
//  Created by hak (tharun)
//

use tracing::{debug, info};

use super::engine::TraversalGraph;
use super::types::{EdgeData, NodeData};
use crate::error::Result;
use crate::permission::PermissionPolicy;
use crate::schema::{camel_case, kebab_case, merge_candidates, FieldType, MetadataSource};

/// Build a traversal graph from candidate types.
///
/// Runs in two passes. The node pass creates a node for every candidate the
/// policy exposes. The edge pass gives each node exactly one edge per declared
/// field, classified as relation, collection or value. A relation the policy
/// rejects is downgraded to a value edge rather than dropped.
///
/// Only type-level metadata is read. Any metadata failure aborts the build.
pub fn build_graph<S: AsRef<str>>(
    classes: &[S],
    metadata: &dyn MetadataSource,
    policy: &dyn PermissionPolicy,
) -> Result<TraversalGraph> {
    let mut graph = TraversalGraph::new();

    // Nodes first, so the edge pass can see every exposed type
    let mut exposed = Vec::new();
    for class in classes {
        let type_name = class.as_ref();
        if graph.has_node(type_name) {
            continue;
        }
        if !policy.is_exposed(type_name) {
            debug!(type_name, "type not exposed, skipping");
            continue;
        }
        let display_name = metadata
            .declared_name(type_name)
            .map_err(|e| e.in_type(type_name))?
            .unwrap_or_else(|| camel_case(type_name));
        let path = metadata
            .declared_path(type_name)
            .map_err(|e| e.in_type(type_name))?
            .unwrap_or_else(|| kebab_case(type_name));
        let idx = graph.add_entity(NodeData::new_entity(
            type_name.to_string(),
            display_name,
            path,
        ));
        exposed.push((type_name, idx));
    }

    for (type_name, idx) in exposed {
        let fields = metadata
            .list_fields(type_name)
            .map_err(|e| e.in_type(type_name))?;
        for field in fields {
            let candidates = metadata
                .type_candidates(type_name, &field)
                .map_err(|e| e.in_field(type_name, &field))?;
            let merged = merge_candidates(&candidates);
            let edge = classify(&graph, type_name, &field, merged.as_ref(), policy);
            if !graph.add_field_edge(idx, edge) {
                debug!(type_name, field = %field, "field declared twice, keeping first");
            }
        }
    }

    let stats = graph.stats();
    info!(
        nodes = stats.nodes,
        edges = stats.total_edges(),
        relations = stats.relation_edges,
        collections = stats.collection_edges,
        "traversal graph built"
    );
    Ok(graph)
}

/// Decide the edge for one field from its merged type.
///
/// A related type without a node of its own never yields a relation edge.
fn classify(
    graph: &TraversalGraph,
    type_name: &str,
    field: &str,
    merged: Option<&FieldType>,
    policy: &dyn PermissionPolicy,
) -> EdgeData {
    if let Some(field_type) = merged {
        if let Some(related) = field_type.class_name.as_deref() {
            if graph.has_node(related) && policy.is_relation_exposed(type_name, field, related) {
                return EdgeData::relation(field, related);
            }
            debug!(type_name, field, related, "relation not exposed, downgrading to value");
        } else if field_type.is_collection_like() {
            if let Some(related) = field_type.element_class() {
                if graph.has_node(related) && policy.is_relation_exposed(type_name, field, related)
                {
                    return EdgeData::collection(field, related);
                }
                debug!(type_name, field, related, "collection not exposed, downgrading to value");
            }
        }
    }
    EdgeData::value(field)
}
