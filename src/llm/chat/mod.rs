pub mod euron;

use async_trait::async_trait;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::euron::EuronChatClient;
use crate::models::chat::{ ChatMessage, InputMessage, Role };

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Credential missing or blank; raised before any request is sent.
    #[error("{0}")]
    Configuration(String),
    #[error("Euron API Error: {status} {body}")]
    Provider {
        status: u16,
        body: String,
    },
    #[error("Unexpected completion response: {0}")]
    Parse(String),
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatGeneration {
    pub message: ChatMessage,
}

/// Generations produced by one chat call. The adapters here always produce exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    pub generations: Vec<ChatGeneration>,
}

impl ChatResult {
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            generations: vec![ChatGeneration {
                message: ChatMessage::new(Role::Assistant, content),
            }],
        }
    }

    pub fn first_content(&self) -> Option<&str> {
        self.generations.first().map(|g| g.message.content.as_str())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn generate(&self, messages: &[InputMessage]) -> Result<ChatResult, ChatError>;

    fn llm_type(&self) -> &'static str;
    fn get_model(&self) -> String;
}

/// Resolves every message to its wire form, keeping order and content as given.
pub fn normalize_messages(messages: &[InputMessage]) -> Vec<ChatMessage> {
    messages.iter().map(InputMessage::to_wire).collect()
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Euron => {
            let specific_client = EuronChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        ref other => {
            return Err(
                ChatError::Configuration(
                    format!("LLM type '{}' does not provide chat completions", other)
                )
            );
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::MessageKind;

    #[test]
    fn normalization_preserves_order_and_content() {
        let messages = vec![
            InputMessage::system("You answer questions about a portfolio."),
            InputMessage::human("Who are you?"),
            InputMessage::ai("An assistant."),
            InputMessage::plain("user", "  spaced\ncontent  "),
            InputMessage::Tagged { kind: MessageKind::parse("assistant"), content: "ok".into() },
            InputMessage::Tagged { kind: MessageKind::parse("function"), content: "{}".into() },
        ];

        let wire = normalize_messages(&messages);
        let roles: Vec<&str> = wire.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user", "assistant", "function"]);

        let contents: Vec<&str> = wire.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            [
                "You answer questions about a portfolio.",
                "Who are you?",
                "An assistant.",
                "  spaced\ncontent  ",
                "ok",
                "{}",
            ]
        );
    }

    #[test]
    fn empty_history_normalizes_to_empty() {
        assert!(normalize_messages(&[]).is_empty());
    }

    #[test]
    fn single_result_wraps_assistant_message() {
        let result = ChatResult::single("Hello!");
        assert_eq!(result.generations.len(), 1);
        assert_eq!(result.generations[0].message.role, "assistant");
        assert_eq!(result.first_content(), Some("Hello!"));
    }

    #[test]
    fn provider_error_mentions_status_and_body() {
        let err = ChatError::Provider { status: 401, body: "{\"error\":\"bad key\"}".into() };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("bad key"));
    }

    #[test]
    fn non_chat_type_is_rejected() {
        let config = LlmConfig { llm_type: LlmType::HuggingFace, ..LlmConfig::default() };
        assert!(matches!(new_client(&config), Err(ChatError::Configuration(_))));
    }
}
