//! External entity store used by entity-aware denormalization.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

use super::{EntityRef, Identity};

/// Loads pre-existing instances by identifier.
pub trait EntityStore {
    fn find_by_id(&self, type_name: &str, id: &str) -> Result<Option<EntityRef>>;
}

/// In-memory store keyed by `(type, id)`.
#[derive(Default)]
pub struct MemoryStore {
    entities: HashMap<(String, String), EntityRef>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an instance under its own identifier.
    ///
    /// Returns `false` (and stores nothing) when the instance has no identifier set.
    pub fn insert(&mut self, entity: EntityRef) -> bool {
        let key = {
            let e = entity.borrow();
            match e.identity() {
                Identity::Id(Some(id)) => (e.type_name().to_string(), id),
                _ => return false,
            }
        };
        self.entities.insert(key, entity);
        true
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn find_by_id(&self, type_name: &str, id: &str) -> Result<Option<EntityRef>> {
        Ok(self
            .entities
            .get(&(type_name.to_string(), id.to_string()))
            .map(Rc::clone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{entity_ref, Record};

    #[test]
    fn test_insert_and_find() {
        let mut store = MemoryStore::new();
        let author = entity_ref(Record::new("app::Author", ["id", "name"]).with("id", 1));
        assert!(store.insert(Rc::clone(&author)));

        let found = store.find_by_id("app::Author", "1").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &author));
        assert!(store.find_by_id("app::Author", "2").unwrap().is_none());
        assert!(store.find_by_id("app::Book", "1").unwrap().is_none());
    }

    #[test]
    fn test_insert_without_id_is_refused() {
        let mut store = MemoryStore::new();
        assert!(!store.insert(entity_ref(Record::new("app::Author", ["id"]))));
        assert!(!store.insert(entity_ref(Record::new("app::Note", ["text"]))));
        assert!(store.is_empty());
    }
}
