//! Field values held by entity instances.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use super::{entity_ref, Entity, EntityRef};

/// Value of one entity field.
#[derive(Clone, Default)]
pub enum FieldValue {
    #[default]
    Null,
    /// A scalar or any opaque structured value, stored as-is.
    Scalar(Value),
    /// A single related entity.
    Entity(EntityRef),
    /// Ordered collection.
    List(Vec<FieldValue>),
    /// Keyed collection, in insertion order.
    Map(Vec<(String, FieldValue)>),
}

impl FieldValue {
    /// Wrap an entity as a related value.
    pub fn entity<E: Entity + 'static>(entity: E) -> Self {
        FieldValue::Entity(entity_ref(entity))
    }

    /// Scalar taken from a generic tree; JSON null becomes [`FieldValue::Null`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            other => FieldValue::Scalar(other.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Scalar(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Scalar(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Scalar(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            FieldValue::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual form of an identifier value, if it is set.
    ///
    /// Null, the empty string and numeric zero count as unset.
    pub fn to_identifier(&self) -> Option<String> {
        match self {
            FieldValue::Scalar(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            FieldValue::Scalar(Value::Number(n)) if n.as_f64() != Some(0.0) => {
                Some(n.to_string())
            }
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    /// Scalars compare by value, entities by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Scalar(a), FieldValue::Scalar(b)) => a == b,
            (FieldValue::Entity(a), FieldValue::Entity(b)) => Rc::ptr_eq(a, b),
            (FieldValue::List(a), FieldValue::List(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for FieldValue {
    // Entities print as their type only: object graphs may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "Null"),
            FieldValue::Scalar(v) => write!(f, "Scalar({})", v),
            FieldValue::Entity(e) => match e.try_borrow() {
                Ok(entity) => write!(f, "Entity({})", entity.type_name()),
                Err(_) => write!(f, "Entity(<borrowed>)"),
            },
            FieldValue::List(items) => f.debug_list().entries(items).finish(),
            FieldValue::Map(pairs) => f
                .debug_map()
                .entries(pairs.iter().map(|(k, v)| (k, v)))
                .finish(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from_json(&value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

/// Timestamps are stored in RFC 3339 form.
impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Scalar(Value::from(value.to_rfc3339()))
    }
}

impl From<EntityRef> for FieldValue {
    fn from(value: EntityRef) -> Self {
        FieldValue::Entity(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Record;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_json_maps_null() {
        assert_eq!(FieldValue::from_json(&Value::Null), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!(3)), FieldValue::from(3));
    }

    #[test]
    fn test_entities_compare_by_identity() {
        let a = entity_ref(Record::new("app::Tag", ["label"]));
        let b = entity_ref(Record::new("app::Tag", ["label"]));
        assert_eq!(FieldValue::Entity(Rc::clone(&a)), FieldValue::Entity(a));
        assert_ne!(
            FieldValue::Entity(b),
            FieldValue::entity(Record::new("app::Tag", ["label"]))
        );
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            FieldValue::from(at).as_str(),
            Some("2024-05-01T12:00:00+00:00")
        );
    }

    #[test]
    fn test_to_identifier() {
        assert_eq!(FieldValue::from("abc").to_identifier().as_deref(), Some("abc"));
        assert_eq!(FieldValue::from(42).to_identifier().as_deref(), Some("42"));
        assert_eq!(FieldValue::Null.to_identifier(), None);
        assert_eq!(FieldValue::from("").to_identifier(), None);
        assert_eq!(FieldValue::from(0).to_identifier(), None);
        assert_eq!(FieldValue::from(0.0).to_identifier(), None);
        assert_eq!(FieldValue::from(true).to_identifier(), None);
    }
}
