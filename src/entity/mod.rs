//! Live entity instances and the capabilities the serializer needs from them.
//!
//! The serializer never calls getters or setters by naming convention. Each
//! entity type implements [`Entity`], which reads and writes fields by name,
//! and types are constructed through an [`EntityFactory`] keyed by the stable
//! type identifier.

mod record;
mod store;
mod value;

pub use record::Record;
pub use store::{EntityStore, MemoryStore};
pub use value::FieldValue;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

/// Shared, mutable handle to an entity instance.
///
/// Object graphs may be cyclic, so instances are reference counted and
/// compared by pointer identity.
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Wrap an entity in an [`EntityRef`].
pub fn entity_ref<E: Entity + 'static>(entity: E) -> EntityRef {
    Rc::new(RefCell::new(entity))
}

/// Identity key of an instance, stable for as long as the instance is alive.
pub fn identity_key(entity: &EntityRef) -> usize {
    Rc::as_ptr(entity) as *const () as usize
}

/// How an instance identifies itself in circular-reference placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The type has an identifier field; `None` when it is not set yet.
    Id(Option<String>),
    /// The type has a textual form but no identifier.
    Label(String),
    /// No stable identity is available.
    Opaque,
}

/// Field accessor capability implemented by every exposed entity type.
pub trait Entity {
    /// Stable type identifier, the key of the type's graph node.
    fn type_name(&self) -> &str;

    /// Read a field.
    fn get(&self, field: &str) -> Result<FieldValue>;

    /// Write a field.
    fn set(&mut self, field: &str, value: FieldValue) -> Result<()>;

    fn identity(&self) -> Identity {
        Identity::Opaque
    }
}

impl fmt::Debug for dyn Entity {
    // Type only: fields may hold the instance itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.type_name())
    }
}

/// Compact stand-in for an instance: `Type(#id)`, `Type(#label)` or `Type`.
pub fn reference_label(entity: &dyn Entity) -> String {
    match entity.identity() {
        Identity::Id(Some(id)) if !id.is_empty() => format!("{}(#{})", entity.type_name(), id),
        Identity::Id(_) => format!("{}(#null)", entity.type_name()),
        Identity::Label(label) => format!("{}(#{})", entity.type_name(), label),
        Identity::Opaque => entity.type_name().to_string(),
    }
}

/// Construction capability: a fresh, default-constructed instance of a type.
pub trait EntityFactory {
    fn instantiate(&self, type_name: &str) -> Result<EntityRef>;
}
