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
use super::utils::{data_uri, handle_response, image_generation_not_supported, with_custom_headers};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::chat::Chat;

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_IMAGE_SIZE: &str = "1024x1024";

pub struct OpenAiProvider {
    client: Client,
    config: VendorConfig,
    model: ModelConfig,
}

impl OpenAiProvider {
    pub fn new(config: VendorConfig, model: ModelConfig) -> ProviderResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            config,
            model,
        })
    }

    /// Chat completions take an effort level rather than a token budget
    fn reasoning_effort(budget: u32) -> &'static str {
        match budget {
            0..=2048 => "low",
            2049..=8192 => "medium",
            _ => "high",
        }
    }

    async fn post(&self, path: &str, payload: Value) -> ProviderResult<Value> {
        let url = format!("{}/{}", self.config.host(OPENAI_HOST), path);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key));
        if let Some(organization) = &self.config.organization_id {
            request = request.header("OpenAI-Organization", organization);
        }

        let response = with_custom_headers(request, &self.config)
            .json(&payload)
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse> {
        let context = MappingContext::new(VendorName::OpenAi, &self.model, true);
        let model = options.model_name(&self.model);

        // create messages array with system message first
        let mut messages_array = Vec::new();
        if let Some(system) = options.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages_array.push(json!({"role": "system", "content": system}));
        }
        messages_array.extend(messages_to_openai_spec(&options.messages, &context)?);

        let mut payload = json!({
            "model": model,
            "messages": messages_array,
            "max_completion_tokens": options.max_tokens(),
        });

        if let Some(budget) = options.thinking_budget(self.is_thinking_capable()) {
            payload["reasoning_effort"] = json!(Self::reasoning_effort(budget));
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

        tracing::debug!(model, "sending openai chat completion");
        let response = self.post("v1/chat/completions", payload).await?;

        let content = openai_response_to_content(&response, VendorName::OpenAi)?;
        Ok(ChatResponse::new(
            content,
            get_openai_usage(&response),
            get_openai_stop_reason(&response),
            &self.model,
        ))
    }

    async fn generate_image(&self, chat: &Chat) -> ProviderResult<String> {
        if !self.is_image_generation_capable() {
            return Err(image_generation_not_supported(
                VendorName::OpenAi,
                &self.model.name,
            ));
        }

        let model = if chat.model.is_empty() {
            &self.model.name
        } else {
            &chat.model
        };
        let payload = json!({
            "model": model,
            "prompt": chat.prompt,
            "n": 1,
            "size": OPENAI_IMAGE_SIZE,
        });

        tracing::debug!(model, "sending openai image generation");
        let response = self.post("v1/images/generations", payload).await?;

        let image = &response["data"][0];
        if let Some(url) = image["url"].as_str() {
            Ok(url.to_string())
        } else if let Some(data) = image["b64_json"].as_str() {
            Ok(data_uri("image/png", data))
        } else {
            Err(ProviderError::InvalidResponse(
                "no image in generation response".to_string(),
            ))
        }
    }
}
