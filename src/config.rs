//
//  config.rs
//  Trellis
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::permission::{DefaultPermissionPolicy, PermissionPolicy, PermitAll, DEFAULT_ALLOWED_TYPES};
use crate::serializer::DEFAULT_IDENTIFIER_FIELD;

/// Top-level Trellis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrellisConfig {
    #[serde(default)]
    pub serializer: SerializerConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

/// Serializer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Default depth budget for normalization. Unbounded when unset.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Field used to look up existing instances when denormalizing.
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,
}

/// Permission settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Expose every type and relation.
    #[serde(default)]
    pub allow_all: bool,
    /// Exposed types (and relation targets) when `allow_all` is off.
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,
}

fn default_identifier_field() -> String {
    DEFAULT_IDENTIFIER_FIELD.to_string()
}

fn default_allow() -> Vec<String> {
    DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect()
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            identifier_field: default_identifier_field(),
        }
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            allow_all: false,
            allow: default_allow(),
        }
    }
}

impl TrellisConfig {
    /// Load config from a TOML file, falling back to defaults when it is missing.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Permission policy described by the `[permissions]` section.
    pub fn policy(&self) -> Box<dyn PermissionPolicy> {
        if self.permissions.allow_all {
            Box::new(PermitAll)
        } else {
            Box::new(DefaultPermissionPolicy::new(
                self.permissions.allow.iter().cloned(),
            ))
        }
    }
}
