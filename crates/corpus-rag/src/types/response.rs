//! Response types for retrieve-and-query

use serde::{Deserialize, Serialize};

/// Response text used when characters were extracted
pub const CHARACTERS_EXTRACTED: &str = "Characters extracted successfully";

/// A character found in the retrieved context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Model-assigned identifier (uniqueness is not checked)
    pub id: i64,
    /// Character name
    pub name: String,
    /// Brief description
    pub description: String,
    /// Key personality traits
    pub personality: String,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// Raw model completion, or a fixed message in structured mode
    pub response: String,
    /// Extracted characters (structured mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterRecord>>,
}

impl ResponsePayload {
    /// Payload carrying the model's free-form answer
    pub fn free_form(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            characters: None,
        }
    }

    /// Payload carrying extracted characters
    pub fn characters(characters: Vec<CharacterRecord>) -> Self {
        Self {
            response: CHARACTERS_EXTRACTED.to_string(),
            characters: Some(characters),
        }
    }
}

/// Success envelope returned by the HTTP endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The payload
    pub payload: ResponsePayload,
}

impl From<ResponsePayload> for QueryResponse {
    fn from(payload: ResponsePayload) -> Self {
        Self { payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_free_form_omits_characters() {
        let body = serde_json::to_value(QueryResponse::from(ResponsePayload::free_form("tea")))
            .unwrap();
        assert_eq!(body, json!({ "payload": { "response": "tea" } }));
    }

    #[test]
    fn test_structured_payload_shape() {
        let payload = ResponsePayload::characters(vec![CharacterRecord {
            id: 1,
            name: "A".into(),
            description: "d".into(),
            personality: "p".into(),
        }]);
        let body = serde_json::to_value(QueryResponse::from(payload)).unwrap();
        assert_eq!(
            body,
            json!({
                "payload": {
                    "response": "Characters extracted successfully",
                    "characters": [
                        { "id": 1, "name": "A", "description": "d", "personality": "p" }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_empty_character_list_is_serialized() {
        let body = serde_json::to_value(ResponsePayload::characters(Vec::new())).unwrap();
        assert_eq!(body["characters"], json!([]));
    }
}
