use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::configs::ModelConfig;
use super::cost::{calculate_usage, UsageResponse};
use super::utils::normalize_tool;
use crate::errors::{ProviderError, ProviderResult, MCP_NOT_SUPPORTED_MESSAGE};
use crate::models::chat::{Chat, ChatOverrides};
use crate::models::content::ContentBlock;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::ToolDefinition;

/// Some vendor APIs reject requests without an explicit output limit
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Raw token counts as reported by the vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
        total_tokens: Option<u64>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: Role,
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageResponse>,
    #[serde(default)]
    pub token_usage: Usage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

impl ChatResponse {
    /// An assistant response, priced with the model's rates when they are known
    pub fn new(
        content: Vec<ContentBlock>,
        token_usage: Usage,
        stop_reason: Option<String>,
        model: &ModelConfig,
    ) -> Self {
        let usage = calculate_usage(
            token_usage.input_tokens,
            token_usage.output_tokens,
            model.input_token_cost,
            model.output_token_cost,
        );
        Self {
            role: Role::Assistant,
            content,
            usage,
            token_usage,
            stop_reason,
        }
    }

    /// The response as a message, ready to be appended to the chat history
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// Everything a single `generate_response` call needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    /// Model id; empty means the adapter's configured model
    pub model: String,
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub budget_tokens: Option<u32>,
    pub thinking_mode: bool,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl GenerateOptions {
    /// Build the options for one turn of `chat`, with `overrides` winning over chat values
    pub fn from_chat(chat: &Chat, overrides: Option<&ChatOverrides>, vision_capable: bool) -> Self {
        let mut messages = chat.response_history.clone();
        if !chat.prompt.is_empty() {
            let mut prompt = Message::user();
            if let Some(image) = &chat.image {
                if vision_capable {
                    prompt = prompt.with_content(image.to_content());
                } else {
                    tracing::debug!(model = %chat.model, "model is not vision capable, skipping chat image");
                }
            }
            messages.push(prompt.with_text(chat.prompt.clone()));
        }

        let thinking_mode = chat.budget_tokens.is_some_and(|budget| budget > 0);
        let overrides = overrides.cloned().unwrap_or_default();

        GenerateOptions {
            model: chat.model.clone(),
            messages,
            system_prompt: chat.system_prompt.clone(),
            max_tokens: overrides.max_tokens.or(chat.max_tokens),
            budget_tokens: if thinking_mode { chat.budget_tokens } else { None },
            thinking_mode,
            tools: chat.tools.iter().map(normalize_tool).collect(),
            temperature: overrides.temperature.or(chat.temperature),
            top_p: overrides.top_p,
        }
    }

    pub fn model_name<'a>(&'a self, config: &'a ModelConfig) -> &'a str {
        if self.model.is_empty() {
            &config.name
        } else {
            &self.model
        }
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Reasoning budget to request, or `None` when thinking is off or unsupported.
    /// Without an explicit budget half of the output allowance goes to reasoning.
    pub fn thinking_budget(&self, thinking_capable: bool) -> Option<u32> {
        if !self.thinking_mode || !thinking_capable {
            return None;
        }
        match self.budget_tokens {
            Some(budget) if budget > 0 => Some(budget),
            _ => Some(self.max_tokens() / 2),
        }
    }
}

/// Base trait for AI providers (OpenAI, Anthropic, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// The model this adapter was built for
    fn model_config(&self) -> &ModelConfig;

    fn is_vision_capable(&self) -> bool {
        self.model_config().is_vision_capable
    }

    fn is_image_generation_capable(&self) -> bool {
        self.model_config().is_image_generation_capable
    }

    fn is_thinking_capable(&self) -> bool {
        self.model_config().is_thinking_capable
    }

    fn input_token_cost(&self) -> Option<f64> {
        self.model_config().input_token_cost
    }

    fn output_token_cost(&self) -> Option<f64> {
        self.model_config().output_token_cost
    }

    /// Generate the next message with one call to the vendor
    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse>;

    /// Send the next turn of `chat`. Content mapping happens in `generate_response`.
    async fn send_chat(
        &self,
        chat: &Chat,
        overrides: Option<&ChatOverrides>,
    ) -> ProviderResult<ChatResponse> {
        let options = GenerateOptions::from_chat(chat, overrides, self.is_vision_capable());
        self.generate_response(options).await
    }

    /// Generate an image for the chat prompt, returning a url or a data uri
    async fn generate_image(&self, chat: &Chat) -> ProviderResult<String>;

    /// Tool execution is left to the caller
    async fn send_mcp_chat(
        &self,
        _chat: &Chat,
        _tool: &ToolDefinition,
    ) -> ProviderResult<ChatResponse> {
        Err(ProviderError::NotSupported(
            MCP_NOT_SUPPORTED_MESSAGE.to_string(),
        ))
    }
}
