use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::database::models::{FieldKind, FieldSpec};

/// Columns no caller may write directly
const RESERVED_FIELDS: &[&str] = &["id", "created_at"];

/// Errors that can occur while building a record from input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Field '{0}' cannot be set directly")]
    SystemFieldNotAllowed(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid number for field '{field}': {value}")]
    InvalidNumber { field: String, value: String },
    #[error("Invalid date for field '{field}': {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },
    #[error("Invalid choice for field '{field}': {value}")]
    InvalidChoice { field: String, value: String },
    #[error("{message}")]
    InvalidValue { field: String, message: String },
}

impl RecordError {
    /// The offending field, for highlighting in forms
    pub fn field(&self) -> &str {
        match self {
            RecordError::SystemFieldNotAllowed(field)
            | RecordError::UnknownField(field)
            | RecordError::MissingRequiredField(field) => field,
            RecordError::InvalidNumber { field, .. }
            | RecordError::InvalidDate { field, .. }
            | RecordError::InvalidChoice { field, .. }
            | RecordError::InvalidValue { field, .. } => field,
        }
    }
}

/// Column values destined for a single-row insert or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerces submitted form values according to `specs`.
    ///
    /// Every declared column ends up in the record: blank input becomes the
    /// field's default, or NULL when it has none. Unchecked checkboxes are
    /// absent from form posts and read as `false`. Undeclared keys
    /// are ignored.
    pub fn from_form(specs: &[FieldSpec], form: &HashMap<String, String>) -> Result<Self, RecordError> {
        let mut record = Self::new();
        for spec in specs {
            let raw = form.get(spec.name).map(|v| v.trim()).unwrap_or_default();
            let value = Self::coerce(spec, raw)?;
            record.fields.insert(spec.name.to_string(), value);
        }
        Ok(record)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    /// Every key must be a declared or system column, never a reserved one.
    pub fn validate_columns(&self, specs: &[FieldSpec], system_fields: &[&str]) -> Result<(), RecordError> {
        for key in self.fields.keys() {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                return Err(RecordError::SystemFieldNotAllowed(key.clone()));
            }
            let known = specs.iter().any(|s| s.name == key) || system_fields.contains(&key.as_str());
            if !known {
                return Err(RecordError::UnknownField(key.clone()));
            }
        }
        Ok(())
    }

    pub fn validate_required_fields(&self, specs: &[FieldSpec]) -> Result<(), RecordError> {
        for spec in specs.iter().filter(|s| s.required) {
            match self.fields.get(spec.name) {
                None | Some(Value::Null) => {
                    return Err(RecordError::MissingRequiredField(spec.name.to_string()))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn coerce(spec: &FieldSpec, raw: &str) -> Result<Value, RecordError> {
        if let FieldKind::Flag = spec.kind {
            return Self::coerce_flag(spec, raw);
        }

        let raw = if raw.is_empty() { spec.default.unwrap_or_default() } else { raw };
        if raw.is_empty() {
            if spec.required {
                return Err(RecordError::MissingRequiredField(spec.name.to_string()));
            }
            return Ok(Value::Null);
        }

        let invalid_number = || RecordError::InvalidNumber {
            field: spec.name.to_string(),
            value: raw.to_string(),
        };

        match spec.kind {
            FieldKind::Text | FieldKind::TextArea => Ok(Value::String(raw.to_string())),
            FieldKind::Integer => {
                let n: i64 = raw.parse().map_err(|_| invalid_number())?;
                if n < 0 {
                    return Err(invalid_number());
                }
                Ok(Value::from(n))
            }
            FieldKind::Decimal => {
                let n: f64 = raw.parse().map_err(|_| invalid_number())?;
                if !n.is_finite() || n < 0.0 {
                    return Err(invalid_number());
                }
                Ok(Value::from(n))
            }
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| RecordError::InvalidDate {
                    field: spec.name.to_string(),
                    value: raw.to_string(),
                }),
            FieldKind::Choice(options) => {
                if options.contains(&raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(RecordError::InvalidChoice {
                        field: spec.name.to_string(),
                        value: raw.to_string(),
                    })
                }
            }
            FieldKind::Reference { .. } => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Ok(Value::from(id)),
                _ => Err(invalid_number()),
            },
            FieldKind::Flag => Self::coerce_flag(spec, raw),
        }
    }

    fn coerce_flag(spec: &FieldSpec, raw: &str) -> Result<Value, RecordError> {
        match raw.to_ascii_lowercase().as_str() {
            "" | "0" | "off" | "false" | "no" => Ok(Value::Bool(false)),
            "1" | "on" | "true" | "yes" => Ok(Value::Bool(true)),
            other => Err(RecordError::InvalidValue {
                field: spec.name.to_string(),
                message: format!("Invalid yes/no value for '{}': {}", spec.name, other),
            }),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Contract, Entity, Property};
    use serde_json::json;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn status_defaults_to_vacant() {
        let record = Record::from_form(Property::FIELDS, &form(&[("name", "Villa 12")])).unwrap();
        assert_eq!(record.get("status"), Some(&json!("vacant")));
        assert_eq!(record.get("address"), Some(&Value::Null));
        assert_eq!(record.get("furnished"), Some(&json!(false)));
    }

    #[test]
    fn coerces_typed_fields() {
        let record = Record::from_form(
            Property::FIELDS,
            &form(&[
                ("name", " Villa 12 "),
                ("bedrooms", "3"),
                ("size_sqft", "1850.5"),
                ("furnished", "on"),
                ("status", "occupied"),
                ("ignored", "value"),
            ]),
        )
        .unwrap();
        assert_eq!(record.get("name"), Some(&json!("Villa 12")));
        assert_eq!(record.get("bedrooms"), Some(&json!(3)));
        assert_eq!(record.get("size_sqft"), Some(&json!(1850.5)));
        assert_eq!(record.get("furnished"), Some(&json!(true)));
        assert!(record.get("ignored").is_none());
    }

    #[test]
    fn rejects_bad_input() {
        let missing = Record::from_form(Property::FIELDS, &form(&[("name", "  ")])).unwrap_err();
        assert_eq!(missing, RecordError::MissingRequiredField("name".to_string()));

        let status = Record::from_form(Property::FIELDS, &form(&[("name", "A"), ("status", "sold")])).unwrap_err();
        assert_eq!(status.field(), "status");

        let rooms = Record::from_form(Property::FIELDS, &form(&[("name", "A"), ("bedrooms", "-1")])).unwrap_err();
        assert!(matches!(rooms, RecordError::InvalidNumber { .. }));

        let date = Record::from_form(
            Contract::FIELDS,
            &form(&[("property_id", "1"), ("tenant_id", "1"), ("start_date", "01/02/2026")]),
        )
        .unwrap_err();
        assert!(matches!(date, RecordError::InvalidDate { .. }));
    }

    #[test]
    fn contract_defaults_apply() {
        let record =
            Record::from_form(Contract::FIELDS, &form(&[("property_id", "4"), ("tenant_id", "2")])).unwrap();
        assert_eq!(record.get("status"), Some(&json!("active")));
        assert_eq!(record.get("billing_frequency"), Some(&json!("monthly")));
        assert_eq!(record.get("renewal_notice_days"), Some(&json!(60)));
        assert_eq!(record.get("property_id"), Some(&json!(4)));
    }

    #[test]
    fn column_whitelist() {
        let mut record = Record::new();
        record.set("name", "A").set("created_by", 1);
        assert!(record.validate_columns(Property::FIELDS, Property::SYSTEM_FIELDS).is_ok());

        record.set("id", 9);
        assert_eq!(
            record.validate_columns(Property::FIELDS, Property::SYSTEM_FIELDS),
            Err(RecordError::SystemFieldNotAllowed("id".to_string()))
        );

        let mut unknown = Record::new();
        unknown.set("name\" = 1; --", "x");
        assert!(matches!(
            unknown.validate_columns(Property::FIELDS, &[]),
            Err(RecordError::UnknownField(_))
        ));
    }

    #[test]
    fn required_fields_must_be_non_null() {
        let mut record = Record::new();
        record.set("name", Value::Null);
        assert!(record.validate_required_fields(Property::FIELDS).is_err());
        record.set("name", "Villa");
        assert!(record.validate_required_fields(Property::FIELDS).is_ok());
    }
}
