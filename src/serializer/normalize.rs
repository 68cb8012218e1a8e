//
//  normalize.rs
//  Trellis
//
//  Created by hak (tharun)
//

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use super::GraphSerializer;
use crate::entity::{identity_key, reference_label, EntityRef, FieldValue};
use crate::error::{Result, TrellisError};

/// Identity keys of the objects on the current normalization path.
type Visited = HashSet<usize>;

impl GraphSerializer<'_> {
    /// Convert an entity into a generic tree.
    ///
    /// `depth` is the number of relation hops allowed; `None` is unbounded.
    /// When the budget is spent at a relation field, the whole object being
    /// normalized is replaced by its placeholder. An object reached again
    /// through one of its own descendants is replaced the same way.
    pub fn normalize(&self, entity: &EntityRef, depth: Option<usize>) -> Result<Value> {
        let mut visited = Visited::new();
        self.normalize_entity(entity, depth, &mut visited)
    }

    fn normalize_entity(
        &self,
        entity: &EntityRef,
        depth: Option<usize>,
        visited: &mut Visited,
    ) -> Result<Value> {
        let type_name = entity.borrow().type_name().to_string();
        if !self.graph.has_node(&type_name) {
            return Err(TrellisError::UnsupportedType(type_name));
        }

        let key = identity_key(entity);
        if visited.contains(&key) {
            let placeholder = reference_label(&*entity.borrow());
            debug!(type_name = %type_name, placeholder = %placeholder, "circular reference");
            return Ok(Value::String(placeholder));
        }

        visited.insert(key);
        let result = self.normalize_fields(entity, &type_name, depth, visited);
        visited.remove(&key);
        result
    }

    fn normalize_fields(
        &self,
        entity: &EntityRef,
        type_name: &str,
        depth: Option<usize>,
        visited: &mut Visited,
    ) -> Result<Value> {
        let mut out = Map::new();

        let fields = self
            .metadata
            .list_fields(type_name)
            .map_err(|e| e.in_type(type_name))?;
        for field in fields {
            // Fields without an edge were excluded from the graph
            let Some(edge) = self.graph.find_edge(type_name, &field) else {
                continue;
            };
            let value = entity
                .borrow()
                .get(&field)
                .map_err(|e| e.in_field(type_name, &field))?;

            if edge.target_class.is_none() {
                out.insert(field, opaque(&value));
                continue;
            }

            if depth == Some(0) {
                let placeholder = reference_label(&*entity.borrow());
                debug!(type_name, field = %field, placeholder = %placeholder, "depth budget spent");
                return Ok(Value::String(placeholder));
            }

            let normalized = self
                .normalize_related(&value, depth.map(|d| d - 1), visited)
                .map_err(|e| e.in_field(type_name, &field))?;
            out.insert(field, normalized);
        }

        Ok(Value::Object(out))
    }

    /// Normalize the value of a relation or collection field.
    fn normalize_related(
        &self,
        value: &FieldValue,
        depth: Option<usize>,
        visited: &mut Visited,
    ) -> Result<Value> {
        match value {
            FieldValue::Null => Ok(Value::Null),
            FieldValue::Scalar(v) => Ok(v.clone()),
            FieldValue::Entity(entity) => self.normalize_entity(entity, depth, visited),
            FieldValue::List(items) => items
                .iter()
                .map(|item| self.normalize_related(item, depth, visited))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            FieldValue::Map(pairs) => {
                let mut out = Map::new();
                for (key, item) in pairs {
                    out.insert(key.clone(), self.normalize_related(item, depth, visited)?);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

/// Value-field passthrough. Entities under a value edge are not traversed;
/// they are emitted as their placeholder.
fn opaque(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Scalar(v) => v.clone(),
        FieldValue::Entity(entity) => match entity.try_borrow() {
            Ok(e) => Value::String(reference_label(&*e)),
            Err(_) => Value::Null,
        },
        FieldValue::List(items) => Value::Array(items.iter().map(opaque).collect()),
        FieldValue::Map(pairs) => Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), opaque(v)))
                .collect(),
        ),
    }
}
