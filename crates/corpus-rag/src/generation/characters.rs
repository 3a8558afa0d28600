//! Structured output validation for character extraction
//!
//! The model is asked to return a JSON array of character records. Its
//! output is checked against an explicit schema: the root must be an array,
//! every element an object, and every required field present with the right
//! JSON type. The first violation is reported with the element index and
//! field name. Unknown extra fields are ignored. No repair is attempted.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::CharacterRecord;

/// Ways the model output can break the character record contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// Output is not parseable JSON
    #[error("model output is not valid JSON: {0}")]
    NotJson(String),

    /// Root value is not an array
    #[error("expected a JSON array at the root")]
    RootNotArray,

    /// An element is not an object
    #[error("element {index} is {found}, expected an object")]
    ElementNotObject { index: usize, found: &'static str },

    /// A required field is absent
    #[error("element {index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// A field has the wrong JSON type
    #[error("element {index} field '{field}' must be {expected}, found {found}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Integer => "an integer",
            FieldKind::Text => "a string",
        }
    }
}

/// Schema for the character extraction contract
pub struct CharacterSchema;

impl CharacterSchema {
    const FIELDS: [(&'static str, FieldKind); 4] = [
        ("id", FieldKind::Integer),
        ("name", FieldKind::Text),
        ("description", FieldKind::Text),
        ("personality", FieldKind::Text),
    ];

    /// Parse raw model text into character records
    pub fn parse(raw: &str) -> Result<Vec<CharacterRecord>, ContractViolation> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ContractViolation::NotJson(e.to_string()))?;
        Self::validate(&value)
    }

    /// Check an already-parsed JSON value against the schema
    pub fn validate(value: &Value) -> Result<Vec<CharacterRecord>, ContractViolation> {
        let elements = value.as_array().ok_or(ContractViolation::RootNotArray)?;

        elements
            .iter()
            .enumerate()
            .map(|(index, element)| Self::validate_element(index, element))
            .collect()
    }

    fn validate_element(index: usize, element: &Value) -> Result<CharacterRecord, ContractViolation> {
        let object = element
            .as_object()
            .ok_or(ContractViolation::ElementNotObject {
                index,
                found: json_type(element),
            })?;

        for (field, kind) in Self::FIELDS {
            Self::check_field(index, object, field, kind)?;
        }

        if object.len() > Self::FIELDS.len() {
            tracing::debug!("Character element {} carries extra fields, ignoring them", index);
        }

        // Every field was type-checked above
        Ok(CharacterRecord {
            id: object["id"].as_i64().unwrap_or_default(),
            name: text_field(object, "name"),
            description: text_field(object, "description"),
            personality: text_field(object, "personality"),
        })
    }

    fn check_field(
        index: usize,
        object: &Map<String, Value>,
        field: &'static str,
        kind: FieldKind,
    ) -> Result<(), ContractViolation> {
        let value = object
            .get(field)
            .ok_or(ContractViolation::MissingField { index, field })?;

        let matches = match kind {
            FieldKind::Integer => value.as_i64().is_some(),
            FieldKind::Text => value.is_string(),
        };

        if matches {
            Ok(())
        } else {
            Err(ContractViolation::WrongType {
                index,
                field,
                expected: kind.describe(),
                found: json_type(value),
            })
        }
    }
}

fn text_field(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_record() {
        let records = CharacterSchema::parse(
            r#"[{"id":1,"name":"A","description":"d","personality":"p"}]"#,
        )
        .unwrap();

        assert_eq!(
            records,
            vec![CharacterRecord {
                id: 1,
                name: "A".into(),
                description: "d".into(),
                personality: "p".into(),
            }]
        );
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(CharacterSchema::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            CharacterSchema::parse("not json"),
            Err(ContractViolation::NotJson(_))
        ));
    }

    #[test]
    fn test_root_must_be_array() {
        assert_eq!(
            CharacterSchema::parse(r#"{"id":1,"name":"A","description":"d","personality":"p"}"#),
            Err(ContractViolation::RootNotArray)
        );
    }

    #[test]
    fn test_reports_missing_field_with_index() {
        let err = CharacterSchema::parse(
            r#"[
                {"id":1,"name":"A","description":"d","personality":"p"},
                {"id":2,"name":"B","description":"d"}
            ]"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ContractViolation::MissingField {
                index: 1,
                field: "personality"
            }
        );
    }

    #[test]
    fn test_reports_wrong_type() {
        let err = CharacterSchema::parse(
            r#"[{"id":"one","name":"A","description":"d","personality":"p"}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "element 0 field 'id' must be an integer, found a string");

        let err = CharacterSchema::parse(
            r#"[{"id":1.5,"name":"A","description":"d","personality":"p"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ContractViolation::WrongType { field: "id", .. }));
    }

    #[test]
    fn test_element_must_be_object() {
        assert_eq!(
            CharacterSchema::parse(r#"["Alice"]"#),
            Err(ContractViolation::ElementNotObject {
                index: 0,
                found: "a string"
            })
        );
    }

    #[test]
    fn test_fenced_output_is_not_repaired() {
        let raw = "```json\n[{\"id\":1,\"name\":\"A\",\"description\":\"d\",\"personality\":\"p\"}]\n```";
        assert!(matches!(
            CharacterSchema::parse(raw),
            Err(ContractViolation::NotJson(_))
        ));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let records = CharacterSchema::parse(
            r#"[{"id":7,"name":"A","description":"d","personality":"p","age":30}]"#,
        )
        .unwrap();
        assert_eq!(records[0].id, 7);
    }
}
