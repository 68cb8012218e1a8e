//! Permission policies deciding which types and relations the graph exposes.
//!
//! The default policy only exposes a fixed allow-list of value types, so out
//! of the box no entity relation is traversable. Deployments supply their own
//! policy, or configure the allow-list.

use std::collections::HashSet;

/// Types exposed by [`DefaultPermissionPolicy::default`].
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["chrono::DateTime", "chrono::Duration"];

/// Capability checked by the graph builder.
pub trait PermissionPolicy: Send + Sync {
    /// Whether a candidate type becomes a graph node at all.
    fn is_exposed(&self, type_name: &str) -> bool;

    /// Whether the relation `type_name.field -> related` becomes a relation or collection edge.
    fn is_relation_exposed(&self, type_name: &str, field: &str, related: &str) -> bool;
}

/// Allow-list policy: a type is exposed when listed, a relation when its target is listed.
#[derive(Debug, Clone)]
pub struct DefaultPermissionPolicy {
    allowed: HashSet<String>,
}

impl DefaultPermissionPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, type_name: &str) -> bool {
        self.allowed.contains(type_name)
    }
}

impl Default for DefaultPermissionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TYPES.iter().copied())
    }
}

impl PermissionPolicy for DefaultPermissionPolicy {
    fn is_exposed(&self, type_name: &str) -> bool {
        self.allows(type_name)
    }

    fn is_relation_exposed(&self, _type_name: &str, _field: &str, related: &str) -> bool {
        self.allows(related)
    }
}

/// Exposes every type and every relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl PermissionPolicy for PermitAll {
    fn is_exposed(&self, _type_name: &str) -> bool {
        true
    }

    fn is_relation_exposed(&self, _type_name: &str, _field: &str, _related: &str) -> bool {
        true
    }
}

impl<P: PermissionPolicy + ?Sized> PermissionPolicy for Box<P> {
    fn is_exposed(&self, type_name: &str) -> bool {
        (**self).is_exposed(type_name)
    }

    fn is_relation_exposed(&self, type_name: &str, field: &str, related: &str) -> bool {
        (**self).is_relation_exposed(type_name, field, related)
    }
}
