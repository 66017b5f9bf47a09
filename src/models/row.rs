use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{ValidationError, ValidationResult};

/// A raw record as handed back by the data access layer
pub type Row = Map<String, Value>;

/// Strict mapping from a stored row into a typed record.
///
/// Every required field must be present and no field outside
/// `REQUIRED_FIELDS` and `OPTIONAL_FIELDS` may appear. Value types are
/// then checked by serde.
pub trait FromRow: DeserializeOwned {
    const ENTITY: &'static str;
    const REQUIRED_FIELDS: &'static [&'static str];
    const OPTIONAL_FIELDS: &'static [&'static str] = &[];

    fn from_row(row: Row) -> ValidationResult<Self> {
        for field in Self::REQUIRED_FIELDS {
            if !row.contains_key(*field) {
                return Err(ValidationError::RequiredField {
                    field: format!("{}.{}", Self::ENTITY, field),
                });
            }
        }

        if let Some(unexpected) = row.keys().find(|key| {
            !Self::REQUIRED_FIELDS.contains(&key.as_str())
                && !Self::OPTIONAL_FIELDS.contains(&key.as_str())
        }) {
            return Err(ValidationError::UnexpectedField {
                field: format!("{}.{}", Self::ENTITY, unexpected),
            });
        }

        let value = Value::Object(row);
        let rendered = value.to_string();
        serde_json::from_value(value).map_err(|e| ValidationError::InvalidValue {
            field: Self::ENTITY.to_string(),
            value: rendered,
            reason: e.to_string(),
        })
    }
}
