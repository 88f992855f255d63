use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{ChatResponse, GenerateOptions, Provider};
use super::configs::{ModelConfig, VendorConfig, VendorName};
use super::formats::anthropic::{
    anthropic_response_to_content, get_anthropic_usage, messages_to_anthropic_spec,
    tools_to_anthropic_spec,
};
use super::formats::MappingContext;
use super::utils::{handle_response, image_generation_not_supported, with_custom_headers};
use crate::errors::ProviderResult;
use crate::models::chat::Chat;

pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    config: VendorConfig,
    model: ModelConfig,
}

impl AnthropicProvider {
    pub fn new(config: VendorConfig, model: ModelConfig) -> ProviderResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            config,
            model,
        })
    }

    async fn post(&self, payload: Value) -> ProviderResult<Value> {
        let url = format!("{}/v1/messages", self.config.host(ANTHROPIC_HOST));

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION);

        let response = with_custom_headers(request, &self.config)
            .json(&payload)
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse> {
        let context = MappingContext::new(VendorName::Anthropic, &self.model, true);
        let model = options.model_name(&self.model);
        let anthropic_messages = messages_to_anthropic_spec(&options.messages, &context)?;

        let mut payload = json!({
            "model": model,
            "messages": anthropic_messages,
            "max_tokens": options.max_tokens(),
        });

        if let Some(system) = options.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            payload["system"] = json!(system);
        }
        let tools_spec = tools_to_anthropic_spec(&options.tools);
        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }

        match options.thinking_budget(self.is_thinking_capable()) {
            Some(budget) => {
                payload["thinking"] = json!({"type": "enabled", "budget_tokens": budget});
                // sampling parameters are fixed while extended thinking is on
                if options.temperature.is_some() || options.top_p.is_some() {
                    tracing::debug!(model, "ignoring sampling parameters with thinking enabled");
                }
            }
            None => {
                if let Some(temp) = options.temperature {
                    payload["temperature"] = json!(temp);
                }
                if let Some(top_p) = options.top_p {
                    payload["top_p"] = json!(top_p);
                }
            }
        }

        tracing::debug!(model, "sending anthropic messages request");
        let response = self.post(payload).await?;

        Ok(ChatResponse::new(
            anthropic_response_to_content(&response),
            get_anthropic_usage(&response),
            response["stop_reason"].as_str().map(String::from),
            &self.model,
        ))
    }

    async fn generate_image(&self, _chat: &Chat) -> ProviderResult<String> {
        Err(image_generation_not_supported(
            VendorName::Anthropic,
            &self.model.name,
        ))
    }
}
