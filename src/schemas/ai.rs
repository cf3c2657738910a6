//! Request and response bodies of the `/api/ai/*` endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of a conversation, as sent by the front-end
///
/// `role` and `content` are required strings. Any other fields (`name`,
/// `tool_call_id`, ...) are carried through to the provider untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Form-encoded body accepted by the simple prompt endpoint
#[derive(Debug, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Error body shared by every JSON failure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_keeps_extra_fields() {
        let message: ChatMessage =
            serde_json::from_value(json!({"role": "user", "content": "hi", "name": "bob"})).unwrap();

        assert_eq!(message.role, "user");
        assert_eq!(message.extra.get("name"), Some(&json!("bob")));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"role": "user", "content": "hi", "name": "bob"})
        );
    }

    #[test]
    fn test_chat_message_requires_string_content() {
        assert!(serde_json::from_value::<ChatMessage>(json!({"role": "user", "content": 1})).is_err());
        assert!(serde_json::from_value::<ChatMessage>(json!({"role": "user"})).is_err());
    }

    #[test]
    fn test_user_message_serializes_two_fields() {
        assert_eq!(
            serde_json::to_value(ChatMessage::user("hi")).unwrap(),
            json!({"role": "user", "content": "hi"})
        );
    }
}
