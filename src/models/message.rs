use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Binary attachment in the shape Mailgun's form upload expects
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFile {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub known_length: Option<u64>,
}

/// Value of a single provider form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Files(Vec<CustomFile>),
}

impl FieldValue {
    /// Empty text and empty file lists count as absent
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Files(files) => files.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Files(_) => None,
        }
    }

    pub fn as_files(&self) -> Option<&[CustomFile]> {
        match self {
            FieldValue::Files(files) => Some(files),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

/// Flat provider message, keyed by Mailgun form field name
pub type MessageData = BTreeMap<String, FieldValue>;

/// Response of the Mailgun messages endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesSendResult {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: u16,
}

/// Successful send, with the provider id mirrored as `messageId`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    #[serde(flatten)]
    pub result: MessagesSendResult,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

impl From<MessagesSendResult> for SentMessage {
    fn from(result: MessagesSendResult) -> Self {
        Self {
            message_id: result.id.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_values() {
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::Files(Vec::new()).is_empty());
        assert!(!FieldValue::from("0").is_empty());
    }

    #[test]
    fn test_sent_message_mirrors_id() {
        let result: MessagesSendResult = serde_json::from_value(json!({
            "id": "<msg-1>",
            "message": "Queued. Thank you."
        }))
        .expect("Should parse result");

        let sent = SentMessage::from(result);
        assert_eq!(sent.message_id, "<msg-1>");
        assert_eq!(
            serde_json::to_value(&sent).expect("Should serialize"),
            json!({
                "id": "<msg-1>",
                "message": "Queued. Thank you.",
                "status": 0,
                "messageId": "<msg-1>"
            })
        );
    }
}
