//! Dynamic entity backed by an ordered field list.

use crate::error::{Result, TrellisError};

use super::{Entity, FieldValue, Identity};

/// Name of the field a record treats as its identifier.
const ID_FIELD: &str = "id";

/// An entity whose fields are declared at runtime.
///
/// Records are what schema-file registries construct. Every declared field
/// starts out [`FieldValue::Null`]; reading or writing an undeclared field is
/// an [`TrellisError::UnknownField`].
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, FieldValue)>,
    label: Option<String>,
}

impl Record {
    /// Create a record with the given declared fields, all unset.
    pub fn new<I, S>(type_name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.to_string(),
            fields: fields
                .into_iter()
                .map(|f| (f.into(), FieldValue::Null))
                .collect(),
            label: None,
        }
    }

    /// Set a field, declaring it if needed.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
        self
    }

    /// Give the record a textual form used when it has no identifier.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    fn slot(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    fn unknown(&self, field: &str) -> TrellisError {
        TrellisError::UnknownField {
            type_name: self.type_name.clone(),
            field: field.to_string(),
        }
    }
}

impl Entity for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, field: &str) -> Result<FieldValue> {
        self.slot(field).cloned().ok_or_else(|| self.unknown(field))
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let err = self.unknown(field);
        let slot = self
            .fields
            .iter_mut()
            .find(|(name, _)| name == field)
            .ok_or(err)?;
        slot.1 = value;
        Ok(())
    }

    fn identity(&self) -> Identity {
        match self.slot(ID_FIELD) {
            Some(id) => Identity::Id(id.to_identifier()),
            None => match &self.label {
                Some(label) => Identity::Label(label.clone()),
                None => Identity::Opaque,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_fields_are_null() {
        let record = Record::new("app::Author", ["name", "born"]);
        assert_eq!(record.get("name").unwrap(), FieldValue::Null);
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["name", "born"]);
    }

    #[test]
    fn test_set_and_get() {
        let mut record = Record::new("app::Author", ["name"]);
        record.set("name", "Herbert".into()).unwrap();
        assert_eq!(record.get("name").unwrap().as_str(), Some("Herbert"));
    }

    #[test]
    fn test_undeclared_field_is_rejected() {
        let mut record = Record::new("app::Author", ["name"]);
        assert!(matches!(
            record.get("age"),
            Err(TrellisError::UnknownField { ref field, .. }) if field == "age"
        ));
        assert!(record.set("age", 3.into()).is_err());
    }

    #[test]
    fn test_identity_prefers_id_field() {
        let record = Record::new("app::Author", ["id"])
            .with("id", "a-1")
            .with_label("ignored");
        assert_eq!(record.identity(), Identity::Id(Some("a-1".into())));
    }
}
