use serde::{Deserialize, Serialize};

use super::content::ContentBlock;
use super::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Message { role, content }
    }

    /// Create a new, empty user message
    pub fn user() -> Self {
        Message::new(Role::User, Vec::new())
    }

    /// Create a new, empty assistant message
    pub fn assistant() -> Self {
        Message::new(Role::Assistant, Vec::new())
    }

    /// Add any ContentBlock to the message
    pub fn with_content(mut self, content: ContentBlock) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(ContentBlock::text(text))
    }

    /// Add inline image content to the message
    pub fn with_image_data<S: Into<String>, T: Into<String>>(self, data: S, mime_type: T) -> Self {
        self.with_content(ContentBlock::image_data(data, mime_type))
    }

    pub fn with_image_url<S: Into<String>>(self, url: S) -> Self {
        self.with_content(ContentBlock::image_url(url))
    }

    pub fn with_thinking<S: Into<String>, T: Into<String>>(self, thinking: S, signature: T) -> Self {
        self.with_content(ContentBlock::thinking(thinking, signature))
    }

    /// Add a tool use request to the message
    pub fn with_tool_use<I, N, S>(self, id: I, name: N, input: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        self.with_content(ContentBlock::tool_use(id, name, input))
    }

    /// Add a tool result to the message
    pub fn with_tool_result<I: Into<String>, S: Into<String>>(self, tool_use_id: I, content: S) -> Self {
        self.with_content(ContentBlock::tool_result(tool_use_id, content))
    }

    /// Concatenate every text block, skipping everything else
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
