//! Graph-driven serializer.
//!
//! Converts live entity instances to generic trees (`serde_json::Value`) and
//! back, visiting only what the [`TraversalGraph`] exposes.
//!
//! - **normalize**: walks relation and collection edges recursively, bounded by
//!   an optional depth budget. Objects already on the current path are
//!   replaced with a circular-reference placeholder (`Type(#id)`).
//! - **denormalize**: builds fresh instances through an [`EntityFactory`],
//!   dropping fields the graph does not expose. The store-aware variant
//!   populates pre-existing instances looked up by identifier.

mod denormalize;
mod normalize;

use crate::entity::EntityFactory;
use crate::graph::TraversalGraph;
use crate::schema::MetadataSource;

/// Identifier field used by entity-aware denormalization unless configured otherwise.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "id";

/// Normalizes and denormalizes entities against one traversal graph.
///
/// Holds only shared references; every call keeps its own cycle-detection
/// state, so one serializer can serve any number of calls.
pub struct GraphSerializer<'a> {
    graph: &'a TraversalGraph,
    metadata: &'a dyn MetadataSource,
    factory: &'a dyn EntityFactory,
    identifier_field: &'a str,
}

impl<'a> GraphSerializer<'a> {
    pub fn new(
        graph: &'a TraversalGraph,
        metadata: &'a dyn MetadataSource,
        factory: &'a dyn EntityFactory,
    ) -> Self {
        Self {
            graph,
            metadata,
            factory,
            identifier_field: DEFAULT_IDENTIFIER_FIELD,
        }
    }

    /// Use a different identifier field for store lookups.
    pub fn with_identifier_field(mut self, field: &'a str) -> Self {
        self.identifier_field = field;
        self
    }

    pub fn graph(&self) -> &TraversalGraph {
        self.graph
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Typed entities shared by the serializer tests.

    use std::rc::Rc;

    use crate::entity::{Entity, EntityRef, FieldValue, Identity};
    use crate::error::{Result, TrellisError};
    use crate::schema::{BuiltinKind, EntityDescriptor, EntityType, TypeCandidate};

    #[derive(Default)]
    pub struct Author {
        pub id: Option<i64>,
        pub name: String,
        pub favourite: FieldValue,
    }

    #[derive(Default)]
    pub struct Book {
        pub title: String,
        pub author: FieldValue,
        pub tags: FieldValue,
    }

    fn unknown(type_name: &str, field: &str) -> TrellisError {
        TrellisError::UnknownField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    impl Entity for Author {
        fn type_name(&self) -> &str {
            "app::Author"
        }

        fn get(&self, field: &str) -> Result<FieldValue> {
            match field {
                "id" => Ok(self.id.into()),
                "name" => Ok(self.name.clone().into()),
                "favourite" => Ok(self.favourite.clone()),
                _ => Err(unknown("app::Author", field)),
            }
        }

        fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
            match field {
                "id" => self.id = value.as_i64(),
                "name" => self.name = value.as_str().unwrap_or_default().to_string(),
                "favourite" => self.favourite = value,
                _ => return Err(unknown("app::Author", field)),
            }
            Ok(())
        }

        fn identity(&self) -> Identity {
            Identity::Id(self.id.filter(|&id| id != 0).map(|id| id.to_string()))
        }
    }

    impl EntityType for Author {
        fn descriptor() -> EntityDescriptor {
            EntityDescriptor::new("app::Author")
                .field("id", TypeCandidate::builtin(BuiltinKind::Int))
                .field("name", TypeCandidate::builtin(BuiltinKind::String))
                .field(
                    "favourite",
                    TypeCandidate::relation("app::Book").with_nullable(true),
                )
        }
    }

    impl Entity for Book {
        fn type_name(&self) -> &str {
            "app::Book"
        }

        fn get(&self, field: &str) -> Result<FieldValue> {
            match field {
                "title" => Ok(self.title.clone().into()),
                "author" => Ok(self.author.clone()),
                "tags" => Ok(self.tags.clone()),
                _ => Err(unknown("app::Book", field)),
            }
        }

        fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
            match field {
                "title" => self.title = value.as_str().unwrap_or_default().to_string(),
                "author" => self.author = value,
                "tags" => self.tags = value,
                _ => return Err(unknown("app::Book", field)),
            }
            Ok(())
        }
    }

    impl EntityType for Book {
        fn descriptor() -> EntityDescriptor {
            EntityDescriptor::new("app::Book")
                .field("title", TypeCandidate::builtin(BuiltinKind::String))
                .field("author", TypeCandidate::relation("app::Author"))
                .field("tags", TypeCandidate::collection_of("app::Tag"))
        }
    }

    /// Downcast-free read of a string field.
    pub fn text(entity: &EntityRef, field: &str) -> String {
        entity
            .borrow()
            .get(field)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Related entity stored in a field.
    pub fn related(entity: &EntityRef, field: &str) -> Option<EntityRef> {
        entity
            .borrow()
            .get(field)
            .ok()
            .and_then(|v| v.as_entity().map(Rc::clone))
    }
}
