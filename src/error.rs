//! Error types for Trellis.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, TrellisError>;

/// Everything that can go wrong while building a graph or walking one.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// The type has no node in the traversal graph.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// The registry has no descriptor (or no constructor) for the type.
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    /// An entity accessor does not know the field.
    #[error("Unknown field {field} on {type_name}")]
    UnknownField { type_name: String, field: String },

    /// The generic tree does not have the shape the edge requires.
    #[error("Invalid value for {type_name}.{field}: expected {expected}")]
    InvalidValue {
        type_name: String,
        field: String,
        expected: &'static str,
    },

    /// A tree denormalized into an entity is not a mapping.
    #[error("Expected an object for {0}")]
    NotAnObject(String),

    /// Entity-aware denormalization could not load the referenced instance.
    #[error("Entity {type_name} with id {id} not found")]
    EntityIdNotFound { type_name: String, id: String },

    /// A failure raised while processing one field, tagged with where it happened.
    #[error("{type_name}.{field}: {source}")]
    Field {
        type_name: String,
        field: String,
        #[source]
        source: Box<TrellisError>,
    },

    /// A failure raised while processing one type as a whole.
    #[error("{type_name}: {source}")]
    Type {
        type_name: String,
        #[source]
        source: Box<TrellisError>,
    },

    /// A failure reported by an external collaborator (store, metadata backend).
    #[error("Collaborator error: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Schema file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl TrellisError {
    /// Wrap an error with the type and field it was raised for.
    ///
    /// Errors that already carry field context are wrapped again, so nested
    /// failures read as a path (`Book.author: Author.name: ...`).
    pub fn in_field(self, type_name: &str, field: &str) -> Self {
        TrellisError::Field {
            type_name: type_name.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap an error with the type it was raised for.
    pub fn in_type(self, type_name: &str) -> Self {
        TrellisError::Type {
            type_name: type_name.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap a foreign error coming out of a collaborator.
    pub fn collaborator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TrellisError::Collaborator(Box::new(err))
    }

    /// Strip `Field` and `Type` wrappers and return the underlying failure.
    pub fn root_cause(&self) -> &TrellisError {
        match self {
            TrellisError::Field { source, .. } | TrellisError::Type { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
