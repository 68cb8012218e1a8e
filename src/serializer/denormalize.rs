//
//  denormalize.rs
//  Trellis
//
//  Created by hak (tharun)
//

use serde_json::{Map, Value};
use tracing::debug;

use super::GraphSerializer;
use crate::entity::{EntityRef, EntityStore, FieldValue};
use crate::error::{Result, TrellisError};
use crate::graph::{EdgeData, EdgeKind};

impl GraphSerializer<'_> {
    /// Build a fresh instance of `type_name` from a generic tree.
    ///
    /// Pairs are applied in input order. Fields the graph does not expose are
    /// dropped; fields missing from the tree keep their default value.
    pub fn denormalize(&self, tree: &Value, type_name: &str) -> Result<EntityRef> {
        self.denormalize_entity(tree, type_name, None)
    }

    /// Like [`denormalize`](Self::denormalize), but a tree carrying a non-empty
    /// identifier populates the stored instance with that identifier instead of
    /// a fresh one. Applies at every level of the tree.
    pub fn denormalize_with_store(
        &self,
        tree: &Value,
        type_name: &str,
        store: &dyn EntityStore,
    ) -> Result<EntityRef> {
        self.denormalize_entity(tree, type_name, Some(store))
    }

    fn denormalize_entity(
        &self,
        tree: &Value,
        type_name: &str,
        store: Option<&dyn EntityStore>,
    ) -> Result<EntityRef> {
        if !self.graph.has_node(type_name) {
            return Err(TrellisError::UnsupportedType(type_name.to_string()));
        }
        let Value::Object(pairs) = tree else {
            return Err(TrellisError::NotAnObject(type_name.to_string()));
        };

        let (entity, skip) = match (store, self.stored_id(pairs)) {
            (Some(store), Some(id)) => {
                let entity = store
                    .find_by_id(type_name, &id)
                    .map_err(|e| e.in_type(type_name))?
                    .ok_or_else(|| TrellisError::EntityIdNotFound {
                        type_name: type_name.to_string(),
                        id,
                    })?;
                (entity, Some(self.identifier_field))
            }
            _ => {
                let entity = self
                    .factory
                    .instantiate(type_name)
                    .map_err(|e| e.in_type(type_name))?;
                (entity, None)
            }
        };

        for (field, value) in pairs {
            if skip == Some(field.as_str()) {
                continue;
            }
            let Some(edge) = self.graph.find_edge(type_name, field) else {
                debug!(type_name, field = %field, "dropping unexposed field");
                continue;
            };
            let converted = self
                .convert(edge, type_name, value, store)
                .map_err(|e| e.in_field(type_name, field))?;
            entity
                .borrow_mut()
                .set(field, converted)
                .map_err(|e| e.in_field(type_name, field))?;
        }

        Ok(entity)
    }

    /// Turn one tree value into the field value the edge calls for.
    fn convert(
        &self,
        edge: &EdgeData,
        type_name: &str,
        value: &Value,
        store: Option<&dyn EntityStore>,
    ) -> Result<FieldValue> {
        let Some(class) = edge.target_class.as_deref() else {
            return Ok(FieldValue::from_json(value));
        };
        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        match (edge.kind, value) {
            (EdgeKind::Collection, Value::Array(items)) => items
                .iter()
                .map(|item| self.convert_element(class, item, store))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            (EdgeKind::Collection, Value::Object(items)) => items
                .iter()
                .map(|(key, item)| {
                    self.convert_element(class, item, store)
                        .map(|v| (key.clone(), v))
                })
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::Map),
            (EdgeKind::Collection, _) => Err(TrellisError::InvalidValue {
                type_name: type_name.to_string(),
                field: edge.field.clone(),
                expected: "array or object",
            }),
            _ => Ok(FieldValue::Entity(self.denormalize_entity(value, class, store)?)),
        }
    }

    fn convert_element(
        &self,
        class: &str,
        item: &Value,
        store: Option<&dyn EntityStore>,
    ) -> Result<FieldValue> {
        if item.is_null() {
            return Ok(FieldValue::Null);
        }
        Ok(FieldValue::Entity(self.denormalize_entity(item, class, store)?))
    }

    /// Identifier carried by the tree, if it is set.
    fn stored_id(&self, pairs: &Map<String, Value>) -> Option<String> {
        pairs
            .get(self.identifier_field)
            .and_then(|id| FieldValue::from_json(id).to_identifier())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::entity::{entity_ref, MemoryStore, Record};
    use crate::graph::{build_graph, TraversalGraph};
    use crate::permission::{DefaultPermissionPolicy, PermitAll};
    use crate::schema::{BuiltinKind, EntityDescriptor, Registry, TypeCandidate};
    use crate::serializer::fixtures::{related, text, Author, Book};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_entity::<Author>()
            .register_entity::<Book>()
            .register_record(
                EntityDescriptor::new("app::Tag")
                    .field("id", TypeCandidate::builtin(BuiltinKind::Int))
                    .field("label", TypeCandidate::builtin(BuiltinKind::String)),
            );
        registry
    }

    fn graph(registry: &Registry) -> TraversalGraph {
        build_graph(&registry.types(), registry, &PermitAll).unwrap()
    }

    #[test]
    fn test_denormalize_nested_relation() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer
            .denormalize(
                &json!({"title": "Dune", "author": {"name": "Herbert"}}),
                "app::Book",
            )
            .unwrap();
        assert_eq!(text(&book, "title"), "Dune");
        let author = related(&book, "author").unwrap();
        assert_eq!(author.borrow().type_name(), "app::Author");
        assert_eq!(text(&author, "name"), "Herbert");
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer
            .denormalize(&json!({"title": "Dune", "isbn": "0441013597"}), "app::Book")
            .unwrap();
        assert_eq!(text(&book, "title"), "Dune");
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer.denormalize(&json!({}), "app::Book").unwrap();
        assert_eq!(text(&book, "title"), "");
        assert!(related(&book, "author").is_none());
    }

    #[test]
    fn test_null_relation_is_assigned_directly() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer
            .denormalize(&json!({"author": null}), "app::Book")
            .unwrap();
        assert!(book.borrow().get("author").unwrap().is_null());
    }

    #[test]
    fn test_collection_elements_are_denormalized() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer
            .denormalize(
                &json!({"tags": [{"label": "sci-fi"}, null, {"label": "classic"}]}),
                "app::Book",
            )
            .unwrap();
        let tags = book.borrow().get("tags").unwrap();
        let items = tags.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(text(items[0].as_entity().unwrap(), "label"), "sci-fi");
        assert!(items[1].is_null());
        assert_eq!(text(items[2].as_entity().unwrap(), "label"), "classic");
    }

    #[test]
    fn test_relation_shape_mismatch_is_an_error() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let err = serializer
            .denormalize(&json!({"author": "Herbert"}), "app::Book")
            .unwrap_err();
        assert!(err.to_string().starts_with("app::Book.author:"));
        assert!(matches!(
            err.root_cause(),
            TrellisError::NotAnObject(t) if t == "app::Author"
        ));

        let err = serializer
            .denormalize(&json!({"tags": 3}), "app::Book")
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            TrellisError::InvalidValue { expected: "array or object", .. }
        ));
    }

    #[test]
    fn test_unsupported_target_type() {
        let registry = registry();
        let policy = DefaultPermissionPolicy::new(["app::Book"]);
        let graph = build_graph(&registry.types(), &registry, &policy).unwrap();
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let err = serializer
            .denormalize(&json!({"name": "Herbert"}), "app::Author")
            .unwrap_err();
        assert!(matches!(err, TrellisError::UnsupportedType(t) if t == "app::Author"));
    }

    #[test]
    fn test_downgraded_relation_keeps_raw_value() {
        let registry = registry();
        let policy = DefaultPermissionPolicy::new(["app::Book"]);
        let graph = build_graph(&registry.types(), &registry, &policy).unwrap();
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let book = serializer
            .denormalize(&json!({"author": {"name": "Herbert"}}), "app::Book")
            .unwrap();
        assert_eq!(
            book.borrow().get("author").unwrap(),
            FieldValue::Scalar(json!({"name": "Herbert"}))
        );
    }

    #[test]
    fn test_store_populates_existing_instance() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let mut store = MemoryStore::new();
        let existing = entity_ref(
            Record::new("app::Tag", ["id", "label"])
                .with("id", 5)
                .with("label", "old"),
        );
        store.insert(Rc::clone(&existing));

        let book = serializer
            .denormalize_with_store(
                &json!({"title": "Dune", "tags": [{"id": 5, "label": "new"}, {"label": "fresh"}]}),
                "app::Book",
                &store,
            )
            .unwrap();

        let tags = book.borrow().get("tags").unwrap();
        let items = tags.as_list().unwrap();
        assert!(Rc::ptr_eq(items[0].as_entity().unwrap(), &existing));
        assert_eq!(text(&existing, "label"), "new");
        assert_eq!(existing.borrow().get("id").unwrap().as_i64(), Some(5));
        assert!(!Rc::ptr_eq(items[1].as_entity().unwrap(), &existing));
    }

    #[test]
    fn test_store_miss_is_an_error() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let err = serializer
            .denormalize_with_store(&json!({"id": "9", "label": "x"}), "app::Tag", &MemoryStore::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TrellisError::EntityIdNotFound { ref id, .. } if id == "9"
        ));
    }

    #[test]
    fn test_empty_identifier_builds_fresh_instance() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let tag = serializer
            .denormalize_with_store(&json!({"id": 0, "label": "x"}), "app::Tag", &MemoryStore::new())
            .unwrap();
        assert_eq!(text(&tag, "label"), "x");
        assert_eq!(tag.borrow().get("id").unwrap().as_i64(), Some(0));
    }

    #[test]
    fn test_custom_identifier_field() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer =
            GraphSerializer::new(&graph, &registry, &registry).with_identifier_field("label");

        let mut store = MemoryStore::new();
        let existing = entity_ref(Record::new("app::Tag", ["id", "label"]).with("id", "k"));
        store.insert(Rc::clone(&existing));

        // Label is the lookup key here, and no tag is stored under "k-label"
        let err = serializer
            .denormalize_with_store(&json!({"label": "k-label"}), "app::Tag", &store)
            .unwrap_err();
        assert!(matches!(err, TrellisError::EntityIdNotFound { .. }));
    }

    struct DownStore;

    impl EntityStore for DownStore {
        fn find_by_id(&self, _type_name: &str, _id: &str) -> Result<Option<EntityRef>> {
            Err(TrellisError::collaborator(std::io::Error::new(
                std::io::ErrorKind::Other,
                "db down",
            )))
        }
    }

    #[test]
    fn test_store_failure_names_the_type() {
        let registry = registry();
        let graph = graph(&registry);
        let serializer = GraphSerializer::new(&graph, &registry, &registry);

        let err = serializer
            .denormalize_with_store(&json!({"id": 3}), "app::Tag", &DownStore)
            .unwrap_err();
        assert_eq!(err.to_string(), "app::Tag: Collaborator error: db down");

        let err = serializer
            .denormalize_with_store(&json!({"tags": [{"id": 3}]}), "app::Book", &DownStore)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "app::Book.tags: app::Tag: Collaborator error: db down"
        );
        assert!(matches!(err.root_cause(), TrellisError::Collaborator(_)));
    }
}
