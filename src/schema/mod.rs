//! Type-level metadata: candidate types, their merger, and the entity registry.

pub mod merge;
pub mod metadata;
pub mod registry;
pub mod types;

pub use merge::merge_candidates;
pub use metadata::{camel_case, kebab_case, MetadataSource};
pub use registry::{EntityDescriptor, EntityType, FieldDescriptor, Registry};
pub use types::{BuiltinKind, FieldType, TypeCandidate};
