use serde::{Deserialize, Serialize};

use super::content::ContentBlock;
use super::message::Message;
use super::tool::ToolDefinition;

/// Image attached to the new turn for vision capable models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatImage {
    Url { url: String },
    Base64 { data: String, mime_type: String },
}

impl ChatImage {
    pub fn to_content(&self) -> ContentBlock {
        match self {
            ChatImage::Url { url } => ContentBlock::image_url(url.clone()),
            ChatImage::Base64 { data, mime_type } => {
                ContentBlock::image_data(data.clone(), mime_type.clone())
            }
        }
    }
}

/// One turn of a conversation.
///
/// Built fresh by the caller for every turn. The caller appends the response to
/// `response_history` before building the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub model: String,
    #[serde(default)]
    pub response_history: Vec<Message>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub image: Option<ChatImage>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub budget_tokens: Option<u32>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Chat {
    pub fn new<M: Into<String>, P: Into<String>>(model: M, prompt: P) -> Self {
        Chat {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.response_history = history;
        self
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_image(mut self, image: ChatImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_budget_tokens(mut self, budget_tokens: u32) -> Self {
        self.budget_tokens = Some(budget_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Per-call values that take precedence over the ones stored on the chat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOverrides {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}
