//! Entity registry: type identifiers mapped to metadata and constructors.
//!
//! Types are registered once at startup, either in code (typed entities via
//! [`EntityType`]) or from a schema file (dynamic [`Record`]s):
//!
//! ```toml
//! [[entity]]
//! type = "app::Book"
//! name = "book"
//!
//! [[entity.field]]
//! name = "title"
//! types = [{ builtin = "string" }]
//!
//! [[entity.field]]
//! name = "author"
//! types = [{ builtin = "object", class = "app::Author", nullable = true }]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::entity::{entity_ref, Entity, EntityFactory, EntityRef, Record};
use crate::error::{Result, TrellisError};

use super::metadata::MetadataSource;
use super::types::TypeCandidate;

/// Declared metadata of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Declared display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDescriptor>,
}

/// One declared field with its type candidates, most authoritative first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeCandidate>,
}

impl EntityDescriptor {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: None,
            path: None,
            fields: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn at_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Declare a field with a single type candidate.
    pub fn field(self, name: &str, candidate: TypeCandidate) -> Self {
        self.field_with(name, vec![candidate])
    }

    /// Declare a field with several type candidates.
    pub fn field_with(mut self, name: &str, candidates: Vec<TypeCandidate>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            types: candidates,
        });
        self
    }

    fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A statically typed entity that can describe and construct itself.
pub trait EntityType: Entity + Default + 'static {
    fn descriptor() -> EntityDescriptor;
}

type Constructor = Arc<dyn Fn() -> EntityRef + Send + Sync>;

struct Registration {
    descriptor: EntityDescriptor,
    constructor: Constructor,
}

/// On-disk schema layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaFile {
    #[serde(default, rename = "entity")]
    entities: Vec<EntityDescriptor>,
}

/// Registry of entity types, in registration order.
///
/// Serves as the [`MetadataSource`] for graph building and as the
/// [`EntityFactory`] for denormalization.
#[derive(Default)]
pub struct Registry {
    registrations: Vec<Registration>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with an explicit constructor.
    ///
    /// Registering the same type identifier again replaces the earlier entry
    /// but keeps its position.
    pub fn register<F>(&mut self, descriptor: EntityDescriptor, constructor: F) -> &mut Self
    where
        F: Fn() -> EntityRef + Send + Sync + 'static,
    {
        let registration = Registration {
            descriptor,
            constructor: Arc::new(constructor),
        };
        let type_name = registration.descriptor.type_name.clone();
        match self.index.get(&type_name) {
            Some(&pos) => self.registrations[pos] = registration,
            None => {
                self.index.insert(type_name, self.registrations.len());
                self.registrations.push(registration);
            }
        }
        self
    }

    /// Register a statically typed entity.
    pub fn register_entity<T: EntityType>(&mut self) -> &mut Self {
        self.register(T::descriptor(), || entity_ref(T::default()))
    }

    /// Register a type whose instances are dynamic [`Record`]s.
    pub fn register_record(&mut self, descriptor: EntityDescriptor) -> &mut Self {
        let type_name = descriptor.type_name.clone();
        let fields: Vec<String> = descriptor.fields.iter().map(|f| f.name.clone()).collect();
        self.register(descriptor, move || {
            entity_ref(Record::new(&type_name, fields.iter().cloned()))
        })
    }

    /// Registered type identifiers, in registration order.
    pub fn types(&self) -> Vec<String> {
        self.registrations
            .iter()
            .map(|r| r.descriptor.type_name.clone())
            .collect()
    }

    pub fn descriptor(&self, type_name: &str) -> Option<&EntityDescriptor> {
        self.index
            .get(type_name)
            .map(|&pos| &self.registrations[pos].descriptor)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    // ─── Schema Files ───────────────────────────────────────────

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let schema: SchemaFile = toml::from_str(source)?;
        Ok(Self::from_schema(schema))
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let schema: SchemaFile = serde_yaml::from_str(source)?;
        Ok(Self::from_schema(schema))
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let schema: SchemaFile = serde_json::from_str(source)?;
        Ok(Self::from_schema(schema))
    }

    /// Load a schema file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TrellisError::NotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            other => Err(TrellisError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    fn from_schema(schema: SchemaFile) -> Self {
        let mut registry = Self::new();
        for descriptor in schema.entities {
            registry.register_record(descriptor);
        }
        registry
    }

    fn require(&self, type_name: &str) -> Result<&Registration> {
        self.index
            .get(type_name)
            .map(|&pos| &self.registrations[pos])
            .ok_or_else(|| TrellisError::UnknownEntity(type_name.to_string()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types())
            .finish()
    }
}

impl MetadataSource for Registry {
    fn list_fields(&self, type_name: &str) -> Result<Vec<String>> {
        Ok(self
            .require(type_name)?
            .descriptor
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    fn type_candidates(&self, type_name: &str, field: &str) -> Result<Vec<TypeCandidate>> {
        let descriptor = &self.require(type_name)?.descriptor;
        descriptor
            .find_field(field)
            .map(|f| f.types.clone())
            .ok_or_else(|| TrellisError::UnknownField {
                type_name: type_name.to_string(),
                field: field.to_string(),
            })
    }

    fn declared_name(&self, type_name: &str) -> Result<Option<String>> {
        Ok(self.require(type_name)?.descriptor.name.clone())
    }

    fn declared_path(&self, type_name: &str) -> Result<Option<String>> {
        Ok(self.require(type_name)?.descriptor.path.clone())
    }
}

impl EntityFactory for Registry {
    fn instantiate(&self, type_name: &str) -> Result<EntityRef> {
        Ok((self.require(type_name)?.constructor)())
    }
}
