use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{ChatResponse, GenerateOptions, Provider};
use super::configs::{ModelConfig, VendorConfig, VendorName};
use super::formats::openai::{
    get_openai_stop_reason, get_openai_usage, messages_to_openai_spec, openai_response_to_content,
    tools_to_openai_spec,
};
use super::formats::MappingContext;
use super::utils::{handle_response, image_generation_not_supported, with_custom_headers};
use crate::errors::ProviderResult;
use crate::models::chat::Chat;

pub const DEEPSEEK_HOST: &str = "https://api.deepseek.com";

/// DeepSeek speaks the chat completions protocol, without image input.
/// Reasoning models return their trace as `reasoning_content`.
pub struct DeepSeekProvider {
    client: Client,
    config: VendorConfig,
    model: ModelConfig,
}

impl DeepSeekProvider {
    pub fn new(config: VendorConfig, model: ModelConfig) -> ProviderResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            config,
            model,
        })
    }

    async fn post(&self, payload: Value) -> ProviderResult<Value> {
        let url = format!("{}/chat/completions", self.config.host(DEEPSEEK_HOST));

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key));

        let response = with_custom_headers(request, &self.config)
            .json(&payload)
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse> {
        let context = MappingContext::new(VendorName::DeepSeek, &self.model, false);
        let model = options.model_name(&self.model);

        let mut messages_array = Vec::new();
        if let Some(system) = options.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages_array.push(json!({"role": "system", "content": system}));
        }
        messages_array.extend(messages_to_openai_spec(&options.messages, &context)?);

        let mut payload = json!({
            "model": model,
            "messages": messages_array,
            "max_tokens": options.max_tokens(),
        });

        if let Some(budget) = options.thinking_budget(self.is_thinking_capable()) {
            // the reasoning length is chosen by the model itself
            tracing::debug!(model, budget, "deepseek reasoning has no budget parameter");
        }
        let tools_spec = tools_to_openai_spec(&options.tools);
        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }
        if let Some(temp) = options.temperature {
            payload["temperature"] = json!(temp);
        }
        if let Some(top_p) = options.top_p {
            payload["top_p"] = json!(top_p);
        }

        tracing::debug!(model, "sending deepseek chat completion");
        let response = self.post(payload).await?;

        let content = openai_response_to_content(&response, VendorName::DeepSeek)?;
        Ok(ChatResponse::new(
            content,
            get_openai_usage(&response),
            get_openai_stop_reason(&response),
            &self.model,
        ))
    }

    async fn generate_image(&self, _chat: &Chat) -> ProviderResult<String> {
        Err(image_generation_not_supported(
            VendorName::DeepSeek,
            &self.model.name,
        ))
    }
}
