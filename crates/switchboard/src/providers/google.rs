use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{ChatResponse, GenerateOptions, Provider};
use super::configs::{ModelConfig, VendorConfig, VendorName};
use super::formats::google::{
    get_google_stop_reason, get_google_usage, google_response_to_content, messages_to_google_spec,
    tools_to_google_spec,
};
use super::formats::MappingContext;
use super::utils::{data_uri, handle_response, image_generation_not_supported, with_custom_headers};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::chat::Chat;
use crate::models::content::ContentBlock;
use crate::models::message::Message;

pub const GOOGLE_HOST: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: Client,
    config: VendorConfig,
    model: ModelConfig,
}

impl GoogleProvider {
    pub fn new(config: VendorConfig, model: ModelConfig) -> ProviderResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            config,
            model,
        })
    }

    async fn post(&self, model: &str, payload: Value) -> ProviderResult<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host(GOOGLE_HOST),
            model.trim_start_matches("models/")
        );

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key);

        let response = with_custom_headers(request, &self.config)
            .json(&payload)
            .send()
            .await?;
        handle_response(response).await
    }

    fn context(&self) -> MappingContext {
        MappingContext::new(VendorName::Google, &self.model, true)
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    async fn generate_response(&self, options: GenerateOptions) -> ProviderResult<ChatResponse> {
        let model = options.model_name(&self.model);
        let contents = messages_to_google_spec(&options.messages, &self.context())?;

        let mut generation_config = json!({"maxOutputTokens": options.max_tokens()});
        if let Some(temp) = options.temperature {
            generation_config["temperature"] = json!(temp);
        }
        if let Some(top_p) = options.top_p {
            generation_config["topP"] = json!(top_p);
        }
        if let Some(budget) = options.thinking_budget(self.is_thinking_capable()) {
            generation_config["thinkingConfig"] =
                json!({"thinkingBudget": budget, "includeThoughts": true});
        }

        let mut payload = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(system) = options.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            payload["systemInstruction"] = json!({"parts": [{"text": system}]});
        }
        let tools_spec = tools_to_google_spec(&options.tools);
        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }

        tracing::debug!(model, "sending gemini generateContent request");
        let response = self.post(model, payload).await?;

        Ok(ChatResponse::new(
            google_response_to_content(&response)?,
            get_google_usage(&response),
            get_google_stop_reason(&response),
            &self.model,
        ))
    }

    async fn generate_image(&self, chat: &Chat) -> ProviderResult<String> {
        if !self.is_image_generation_capable() {
            return Err(image_generation_not_supported(
                VendorName::Google,
                &self.model.name,
            ));
        }

        let model = if chat.model.is_empty() {
            self.model.name.as_str()
        } else {
            chat.model.as_str()
        };

        let mut prompt = Message::user();
        if let Some(image) = chat.image.as_ref().filter(|_| self.is_vision_capable()) {
            prompt = prompt.with_content(image.to_content());
        }
        let prompt = prompt.with_text(chat.prompt.clone());
        let payload = json!({
            "contents": messages_to_google_spec(&[prompt], &self.context())?,
            "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]},
        });

        tracing::debug!(model, "sending gemini image generation request");
        let response = self.post(model, payload).await?;

        google_response_to_content(&response)?
            .into_iter()
            .find_map(|content| match content {
                ContentBlock::ImageData(image) => Some(data_uri(&image.mime_type, &image.data)),
                _ => None,
            })
            .ok_or_else(|| ProviderError::InvalidResponse("no image in generation response".to_string()))
    }
}
