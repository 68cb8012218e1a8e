//
//  types.rs
//  Trellis
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinKind {
    String,
    Int,
    Float,
    Bool,
    Array,
    Object,
    Null,
    Other,
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuiltinKind::String => "string",
            BuiltinKind::Int => "int",
            BuiltinKind::Float => "float",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Array => "array",
            BuiltinKind::Object => "object",
            BuiltinKind::Null => "null",
            BuiltinKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// One raw description of a field's type, as reported by a single metadata source.
///
/// Every attribute is optional: a source only fills in what it knows.
/// Several candidates for the same field are combined by
/// [`merge_candidates`](super::merge::merge_candidates).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Referenced entity type, when the field holds a single related entity.
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<Box<TypeCandidate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Box<TypeCandidate>>,
}

impl TypeCandidate {
    /// A plain value of the given kind.
    pub fn builtin(kind: BuiltinKind) -> Self {
        Self {
            builtin: Some(kind),
            ..Default::default()
        }
    }

    /// A single related entity.
    pub fn relation(class_name: &str) -> Self {
        Self {
            builtin: Some(BuiltinKind::Object),
            class_name: Some(class_name.to_string()),
            ..Default::default()
        }
    }

    /// A list of related entities, keyed by position.
    pub fn collection_of(class_name: &str) -> Self {
        Self {
            builtin: Some(BuiltinKind::Array),
            collection: Some(true),
            key_type: Some(Box::new(Self::builtin(BuiltinKind::Int))),
            value_type: Some(Box::new(Self::relation(class_name))),
            ..Default::default()
        }
    }

    /// A list of plain values.
    pub fn list_of(kind: BuiltinKind) -> Self {
        Self {
            builtin: Some(BuiltinKind::Array),
            collection: Some(true),
            value_type: Some(Box::new(Self::builtin(kind))),
            ..Default::default()
        }
    }

    /// Set the nullability flag.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}

/// Canonical type of a field, merged from one or more [`TypeCandidate`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldType {
    pub builtin: BuiltinKind,
    pub nullable: bool,
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<Box<FieldType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Box<FieldType>>,
}

impl FieldType {
    /// Whether the field is an ordered/keyed collection of values.
    pub fn is_collection_like(&self) -> bool {
        self.collection || self.builtin == BuiltinKind::Array
    }

    /// Entity type of the collection elements, if the elements are entities.
    pub fn element_class(&self) -> Option<&str> {
        self.value_type
            .as_ref()
            .and_then(|t| t.class_name.as_deref())
    }
}
