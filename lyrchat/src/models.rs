//! Wire types for the chat-completion API

use serde::{Deserialize, Serialize};

/// Request body for `POST {base}/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// One conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response body of `POST {base}/chat/completions`
///
/// Every field is defaulted so a malformed or truncated body deserializes
/// to "no usable content" instead of a hard parse failure.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extracts `choices[0].message.content` when the node is present.
    ///
    /// An empty string is still a valid answer (the model answered with
    /// nothing); only a missing node counts as "no usable content".
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_extracted() {
        let raw = r#"{"choices":[{"message":{"content":"hello"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_content(), Some("hello".to_string()));
    }

    #[test]
    fn missing_choices_yield_none() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_content().is_none());
    }

    #[test]
    fn blank_content_is_still_an_answer() {
        let raw = r#"{"choices":[{"message":{"content":""}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_content(), Some(String::new()));
    }
}
