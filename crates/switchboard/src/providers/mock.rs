use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::ProviderResult;
use crate::models::chat::Chat;
use crate::models::content::ContentBlock;
use crate::providers::base::{ChatResponse, GenerateOptions, Provider, Usage};
use crate::providers::configs::{ModelConfig, VendorName};
use crate::providers::utils::image_generation_not_supported;

/// A mock provider that returns pre-configured responses and records the options it was sent
pub struct MockProvider {
    model: ModelConfig,
    responses: Arc<Mutex<Vec<Vec<ContentBlock>>>>,
    received: Arc<Mutex<Vec<GenerateOptions>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(model: ModelConfig, responses: Vec<Vec<ContentBlock>>) -> Self {
        Self {
            model,
            responses: Arc::new(Mutex::new(responses)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn received(&self) -> Vec<GenerateOptions> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse> {
        self.received.lock().unwrap().push(options);

        let mut responses = self.responses.lock().unwrap();
        let content = if responses.is_empty() {
            // Return empty text if no more pre-configured responses
            vec![ContentBlock::text("")]
        } else {
            responses.remove(0)
        };
        Ok(ChatResponse::new(
            content,
            Usage::default(),
            None,
            &self.model,
        ))
    }

    async fn generate_image(&self, _chat: &Chat) -> ProviderResult<String> {
        Err(image_generation_not_supported(
            VendorName::OpenAi,
            &self.model.name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ProviderError, MCP_NOT_SUPPORTED_MESSAGE};
    use crate::models::chat::ChatOverrides;
    use crate::models::message::Message;
    use crate::models::role::Role;
    use crate::models::tool::ToolDefinition;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_chat_with_budget() -> ProviderResult<()> {
        let provider = MockProvider::new(
            ModelConfig::new("claude-sonnet-4-0").with_thinking(true),
            vec![vec![ContentBlock::text("done")]],
        );

        let chat = Chat::new("", "Plan a trip").with_budget_tokens(500);
        let response = provider.send_chat(&chat, None).await?;
        assert_eq!(response.content, vec![ContentBlock::text("done")]);
        assert_eq!(response.role, Role::Assistant);

        let received = provider.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].thinking_mode);
        assert_eq!(received[0].budget_tokens, Some(500));
        Ok(())
    }

    #[tokio::test]
    async fn test_send_chat_without_budget() -> ProviderResult<()> {
        let provider = MockProvider::new(ModelConfig::new("gpt-4o"), vec![]);

        let overrides = ChatOverrides {
            temperature: Some(0.1),
            ..Default::default()
        };
        let chat = Chat::new("", "Hi").with_history(vec![Message::user().with_text("Earlier")]);
        provider.send_chat(&chat, Some(&overrides)).await?;

        let received = provider.received();
        assert!(!received[0].thinking_mode);
        assert_eq!(received[0].budget_tokens, None);
        assert_eq!(received[0].temperature, Some(0.1));
        assert_eq!(received[0].messages.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_history_grows_with_responses() -> ProviderResult<()> {
        let provider = MockProvider::new(
            ModelConfig::new("gpt-4o"),
            vec![
                vec![ContentBlock::text("first")],
                vec![ContentBlock::text("second")],
            ],
        );

        let mut chat = Chat::new("", "one");
        let response = provider.send_chat(&chat, None).await?;
        chat.response_history.push(Message::user().with_text("one"));
        chat.response_history.push(response.to_message());
        chat.prompt = "two".to_string();

        let response = provider.send_chat(&chat, None).await?;
        assert_eq!(response.content[0].as_text(), Some("second"));
        assert_eq!(provider.received()[1].messages.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_default_mcp_chat() {
        let provider = MockProvider::new(ModelConfig::new("gpt-4o"), vec![]);
        let tool = ToolDefinition::new("shell", "Run a command", json!({"type": "object"}));
        let err = provider
            .send_mcp_chat(&Chat::new("", "ls"), &tool)
            .await
            .unwrap_err();
        match err {
            ProviderError::NotSupported(message) => assert_eq!(message, MCP_NOT_SUPPORTED_MESSAGE),
            other => panic!("unexpected error: {}", other),
        }
        assert!(provider.received().is_empty());
    }
}
