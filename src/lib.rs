//! # Trellis
//!
//! Generic API layer plumbing for arbitrary entity types.
//!
//! Trellis exposes a set of entity types through one generic representation
//! (`serde_json::Value` trees) without per-entity serialization code.
//!
//! ## Key Features
//!
//! - **Permission-filtered**: a [`PermissionPolicy`] decides which types and relations are visible
//! - **Built once**: the [`TraversalGraph`] is derived from type metadata and shared read-only
//! - **Bounded**: normalization takes a depth budget and replaces cycles with placeholders
//! - **Permissive input**: denormalization drops fields the graph does not expose
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis::{PermitAll, Registry, Trellis};
//!
//! let registry = Registry::load("schema.toml".as_ref()).unwrap();
//! let trellis = Trellis::new(registry, PermitAll);
//!
//! // Generic tree -> entity -> generic tree
//! let input = serde_json::json!({"title": "Dune", "author": {"name": "Herbert"}});
//! let book = trellis.denormalize(&input, "app::Book").unwrap();
//! let output = trellis.normalize_with_depth(&book, Some(2)).unwrap();
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod permission;
pub mod schema;
pub mod serializer;

// Re-exports for convenience
pub use config::TrellisConfig;
pub use entity::{
    entity_ref, Entity, EntityFactory, EntityRef, EntityStore, FieldValue, Identity, MemoryStore,
    Record,
};
pub use error::{Result, TrellisError};
pub use graph::{build_graph, EdgeData, EdgeKind, GraphStats, NodeData, TraversalGraph};
pub use permission::{DefaultPermissionPolicy, PermissionPolicy, PermitAll};
pub use schema::{
    merge_candidates, BuiltinKind, EntityDescriptor, EntityType, FieldType, MetadataSource,
    Registry, TypeCandidate,
};
pub use serializer::GraphSerializer;

use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use config::SerializerConfig;

/// The main Trellis instance.
///
/// Owns the registry and the permission policy, builds the traversal graph on
/// first use and keeps it until the registry or the policy changes.
pub struct Trellis {
    /// Entity types: metadata and constructors.
    registry: Registry,
    /// Decides which types and relations are exposed.
    policy: Box<dyn PermissionPolicy>,
    /// Default depth budget and identifier field.
    serializer: SerializerConfig,
    /// Cached graph, `None` until built or after invalidation.
    graph: RwLock<Option<Arc<TraversalGraph>>>,
}

impl Trellis {
    /// Create an instance with default serializer settings.
    pub fn new<P: PermissionPolicy + 'static>(registry: Registry, policy: P) -> Self {
        Self {
            registry,
            policy: Box::new(policy),
            serializer: SerializerConfig::default(),
            graph: RwLock::new(None),
        }
    }

    /// Create an instance whose policy and serializer settings come from config.
    pub fn from_config(registry: Registry, config: &TrellisConfig) -> Self {
        Self {
            registry,
            policy: config.policy(),
            serializer: config.serializer.clone(),
            graph: RwLock::new(None),
        }
    }

    /// The traversal graph, built on first use.
    pub fn graph(&self) -> Result<Arc<TraversalGraph>> {
        if let Some(graph) = self.graph.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(graph));
        }

        let mut slot = self.graph.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(graph) = slot.as_ref() {
            return Ok(Arc::clone(graph));
        }
        let graph = Arc::new(build_graph(
            &self.registry.types(),
            &self.registry,
            self.policy.as_ref(),
        )?);
        *slot = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Drop the cached graph; the next call rebuilds it.
    pub fn invalidate(&self) {
        let mut slot = self.graph.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("traversal graph invalidated");
        }
    }

    /// Replace the permission policy.
    pub fn set_policy<P: PermissionPolicy + 'static>(&mut self, policy: P) {
        self.policy = Box::new(policy);
        self.invalidate();
    }

    /// Mutable access to the registry. Invalidates the cached graph.
    pub fn registry_mut(&mut self) -> &mut Registry {
        self.invalidate();
        &mut self.registry
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Depth budget used by [`normalize`](Self::normalize).
    pub fn default_depth(&self) -> Option<usize> {
        self.serializer.max_depth
    }

    /// Normalize with the configured default depth budget.
    pub fn normalize(&self, entity: &EntityRef) -> Result<Value> {
        self.normalize_with_depth(entity, self.serializer.max_depth)
    }

    /// Normalize with an explicit depth budget (`None` is unbounded).
    pub fn normalize_with_depth(&self, entity: &EntityRef, depth: Option<usize>) -> Result<Value> {
        let graph = self.graph()?;
        self.serializer_for(&graph).normalize(entity, depth)
    }

    /// Build a fresh instance of `type_name` from a generic tree.
    pub fn denormalize(&self, tree: &Value, type_name: &str) -> Result<EntityRef> {
        let graph = self.graph()?;
        self.serializer_for(&graph).denormalize(tree, type_name)
    }

    /// Denormalize, populating stored instances when the tree carries an identifier.
    pub fn denormalize_with_store(
        &self,
        tree: &Value,
        type_name: &str,
        store: &dyn EntityStore,
    ) -> Result<EntityRef> {
        let graph = self.graph()?;
        self.serializer_for(&graph)
            .denormalize_with_store(tree, type_name, store)
    }

    fn serializer_for<'a>(&'a self, graph: &'a TraversalGraph) -> GraphSerializer<'a> {
        GraphSerializer::new(graph, &self.registry, &self.registry)
            .with_identifier_field(&self.serializer.identifier_field)
    }
}
