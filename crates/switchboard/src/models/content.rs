use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

/// An image the vendor is expected to dereference itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrlContent {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDataContent {
    /// Base64 encoded image bytes
    pub data: String,
    pub mime_type: String,
}

/// A reasoning trace exposed by the model.
///
/// The signature is opaque and vendor specific. It is echoed back exactly as it was
/// received so the vendor can verify the trace on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingContent {
    pub thinking: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactedThinkingContent {
    pub data: String,
}

/// A tool invocation requested by the model. `input` is serialized JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseContent {
    pub id: String,
    pub name: String,
    pub input: String,
}

/// The caller's answer to a [`ToolUseContent`], fed back as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    pub tool_use_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Content passed to or from an LLM
pub enum ContentBlock {
    Text(TextContent),
    ImageUrl(ImageUrlContent),
    ImageData(ImageDataContent),
    Thinking(ThinkingContent),
    RedactedThinking(RedactedThinkingContent),
    ToolUse(ToolUseContent),
    ToolResult(ToolResultContent),
    /// Any block kind this version does not know about. Mappers skip it.
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text(TextContent { text: text.into() })
    }

    pub fn image_url<S: Into<String>>(url: S) -> Self {
        ContentBlock::ImageUrl(ImageUrlContent { url: url.into() })
    }

    pub fn image_data<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        ContentBlock::ImageData(ImageDataContent {
            data: data.into(),
            mime_type: mime_type.into(),
        })
    }

    pub fn thinking<S: Into<String>, T: Into<String>>(thinking: S, signature: T) -> Self {
        ContentBlock::Thinking(ThinkingContent {
            thinking: thinking.into(),
            signature: signature.into(),
        })
    }

    pub fn redacted_thinking<S: Into<String>>(data: S) -> Self {
        ContentBlock::RedactedThinking(RedactedThinkingContent { data: data.into() })
    }

    pub fn tool_use<I, N, S>(id: I, name: N, input: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        ContentBlock::ToolUse(ToolUseContent {
            id: id.into(),
            name: name.into(),
            input: input.into(),
        })
    }

    pub fn tool_result<I: Into<String>, S: Into<String>>(tool_use_id: I, content: S) -> Self {
        ContentBlock::ToolResult(ToolResultContent {
            tool_use_id: tool_use_id.into(),
            name: None,
            content: content.into(),
            is_error: false,
        })
    }

    /// Short name of the block kind, used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::ImageUrl(_) => "image_url",
            ContentBlock::ImageData(_) => "image_data",
            ContentBlock::Thinking(_) => "thinking",
            ContentBlock::RedactedThinking(_) => "redacted_thinking",
            ContentBlock::ToolUse(_) => "tool_use",
            ContentBlock::ToolResult(_) => "tool_result",
            ContentBlock::Unknown => "unknown",
        }
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_thinking(&self) -> Option<&ThinkingContent> {
        match self {
            ContentBlock::Thinking(thinking) => Some(thinking),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUseContent> {
        match self {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::ImageUrl(_) | ContentBlock::ImageData(_))
    }
}
