use serde::{Deserialize, Serialize};

use crate::error::AdviceError;

/// Who wrote a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role tag on the wire; adds `system`, which never appears in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the top choice. Every missing link in
    /// `choices[0].message.content` is reported, not assumed away.
    pub fn into_reply(self) -> Result<String, AdviceError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdviceError::MalformedResponse("no choices".to_string()))?;

        choice
            .message
            .ok_or_else(|| AdviceError::MalformedResponse("choice has no message".to_string()))?
            .content
            .ok_or_else(|| AdviceError::MalformedResponse("message has no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn parse(json: &str) -> CompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_chat_message_serialization() {
        let json = serde_json::to_string(&ChatMessage::assistant("Plant maize now.")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"Plant maize now."}"#);
    }

    #[test]
    fn test_request_serialization() {
        let req = CompletionRequest {
            model: "m".to_string(),
            messages: vec![
                WireMessage {
                    role: WireRole::System,
                    content: "sys".to_string(),
                },
                WireMessage {
                    role: WireRole::User,
                    content: "hi".to_string(),
                },
            ],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"model":"m","messages":[{"role":"system","content":"sys"},{"role":"user","content":"hi"}]}"#
        );
    }

    #[test]
    fn test_reply_from_top_choice() {
        let resp = parse(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Plant maize now."}},{"message":{"content":"second"}}]}"#,
        );
        assert_eq!(resp.into_reply().unwrap(), "Plant maize now.");
    }

    #[test]
    fn test_reply_missing_choices() {
        let err = parse(r#"{"error":{"message":"rate limited"}}"#)
            .into_reply()
            .unwrap_err();
        assert!(matches!(err, AdviceError::MalformedResponse(_)));
    }

    #[test]
    fn test_reply_missing_content() {
        let err = parse(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)
            .into_reply()
            .unwrap_err();
        assert!(err.to_string().contains("no content"));

        let err = parse(r#"{"choices":[{}]}"#).into_reply().unwrap_err();
        assert!(err.to_string().contains("no message"));
    }
}
