use serde_json::{json, Value};

use super::MappingContext;
use crate::errors::ProviderResult;
use crate::models::content::ContentBlock;
use crate::models::message::Message;
use crate::models::tool::ToolDefinition;
use crate::providers::base::Usage;
use crate::providers::configs::VendorName;
use crate::providers::utils::{
    fallback_text, is_synthetic_signature, normalize_input_schema, parse_tool_input,
    reject_unsupported, synthetic_signature, token_count,
};

/// Convert internal messages to the Messages API format
pub fn messages_to_anthropic_spec(
    messages: &[Message],
    context: &MappingContext,
) -> ProviderResult<Vec<Value>> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut blocks = Vec::new();

        for content in &message.content {
            match content {
                ContentBlock::Text(text) => {
                    blocks.push(json!({"type": "text", "text": text.text}));
                }
                ContentBlock::ImageUrl(image) if context.images => {
                    blocks.push(json!({
                        "type": "image",
                        "source": {"type": "url", "url": image.url}
                    }));
                }
                ContentBlock::ImageData(image) if context.images => {
                    blocks.push(json!({
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.mime_type,
                            "data": image.data,
                        }
                    }));
                }
                // Only signatures issued by the vendor itself can be verified
                ContentBlock::Thinking(thinking) if !is_synthetic_signature(&thinking.signature) => {
                    blocks.push(json!({
                        "type": "thinking",
                        "thinking": thinking.thinking,
                        "signature": thinking.signature,
                    }));
                }
                ContentBlock::RedactedThinking(redacted) => {
                    blocks.push(json!({"type": "redacted_thinking", "data": redacted.data}));
                }
                ContentBlock::ToolUse(tool_use) => {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": tool_use.id,
                        "name": tool_use.name,
                        "input": parse_tool_input(&tool_use.input),
                    }));
                }
                ContentBlock::ToolResult(result) => {
                    blocks.push(json!({
                        "type": "tool_result",
                        "tool_use_id": result.tool_use_id,
                        "content": result.content,
                        "is_error": result.is_error,
                    }));
                }
                ContentBlock::Unknown => {
                    tracing::debug!("skipping unknown content block");
                }
                other => reject_unsupported(other, context.vendor, context.policy)?,
            }
        }

        if blocks.is_empty() {
            blocks.push(json!({"type": "text", "text": fallback_text(&message.content)}));
        }

        messages_spec.push(json!({
            "role": message.role,
            "content": blocks,
        }));
    }

    Ok(messages_spec)
}

pub fn tools_to_anthropic_spec(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": normalize_input_schema(&tool.input_schema),
            })
        })
        .collect()
}

/// Convert a Messages API response to canonical content, skipping unknown block types
pub fn anthropic_response_to_content(response: &Value) -> Vec<ContentBlock> {
    let Some(blocks) = response.get("content").and_then(|c| c.as_array()) else {
        return Vec::new();
    };

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                content.push(ContentBlock::text(block["text"].as_str().unwrap_or_default()));
            }
            Some("thinking") => {
                let signature = block["signature"]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| synthetic_signature(VendorName::Anthropic));
                content.push(ContentBlock::thinking(
                    block["thinking"].as_str().unwrap_or_default(),
                    signature,
                ));
            }
            Some("redacted_thinking") => {
                content.push(ContentBlock::redacted_thinking(
                    block["data"].as_str().unwrap_or_default(),
                ));
            }
            Some("tool_use") => {
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                content.push(ContentBlock::tool_use(
                    block["id"].as_str().unwrap_or_default(),
                    block["name"].as_str().unwrap_or_default(),
                    input.to_string(),
                ));
            }
            kind => tracing::debug!(?kind, "skipping unrecognized content block"),
        }
    }
    content
}

pub fn get_anthropic_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let input_tokens = token_count(usage, "input_tokens");
    let output_tokens = token_count(usage, "output_tokens");
    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    };

    Usage::new(input_tokens, output_tokens, total_tokens)
}
