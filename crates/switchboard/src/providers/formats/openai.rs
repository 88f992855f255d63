use std::collections::HashSet;

use serde_json::{json, Value};

use super::MappingContext;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::content::ContentBlock;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::ToolDefinition;
use crate::providers::base::Usage;
use crate::providers::configs::VendorName;
use crate::providers::utils::{
    data_uri, fallback_text, is_valid_function_name, normalize_input_schema, reject_unsupported,
    sanitize_function_name, synthetic_signature, token_count,
};

/// Convert internal Message format to the chat completions message specification.
///
/// Tool results become separate `tool` role messages placed before the rest of the
/// message, so they directly follow the assistant turn that requested them. This is
/// the one place block order changes: text or images sharing a message with tool
/// results are sent after them.
pub fn messages_to_openai_spec(
    messages: &[Message],
    context: &MappingContext,
) -> ProviderResult<Vec<Value>> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut parts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut tool_messages = Vec::new();

        for content in &message.content {
            match content {
                ContentBlock::Text(text) => {
                    parts.push(json!({"type": "text", "text": text.text}));
                }
                ContentBlock::ImageUrl(image) if context.images => {
                    parts.push(json!({
                        "type": "image_url",
                        "image_url": {"url": image.url}
                    }));
                }
                ContentBlock::ImageData(image) if context.images => {
                    parts.push(json!({
                        "type": "image_url",
                        "image_url": {"url": data_uri(&image.mime_type, &image.data)}
                    }));
                }
                ContentBlock::ToolUse(tool_use) if message.role == Role::Assistant => {
                    tool_calls.push(json!({
                        "id": tool_use.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&tool_use.name),
                            "arguments": tool_use.input,
                        }
                    }));
                }
                ContentBlock::ToolResult(result) => {
                    let content = if result.is_error {
                        format!("The tool call returned the following error:\n{}", result.content)
                    } else {
                        result.content.clone()
                    };
                    tool_messages.push(json!({
                        "role": "tool",
                        "tool_call_id": result.tool_use_id,
                        "content": content,
                    }));
                }
                ContentBlock::Unknown => {
                    tracing::debug!("skipping unknown content block");
                }
                other => reject_unsupported(other, context.vendor, context.policy)?,
            }
        }

        let mut converted = json!({"role": message.role});
        if !parts.is_empty() {
            converted["content"] = collapse_parts(parts);
        }
        if !tool_calls.is_empty() {
            converted["tool_calls"] = json!(tool_calls);
        }

        let has_body = converted.get("content").is_some() || converted.get("tool_calls").is_some();
        if !has_body && tool_messages.is_empty() {
            converted["content"] = json!(fallback_text(&message.content));
        }

        messages_spec.extend(tool_messages);
        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            messages_spec.push(converted);
        }
    }

    Ok(messages_spec)
}

/// Plain text goes out as a string, anything with images as a parts array
fn collapse_parts(parts: Vec<Value>) -> Value {
    if parts.iter().all(|part| part["type"] == "text") {
        let text = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("\n");
        json!(text)
    } else {
        json!(parts)
    }
}

/// Convert tool definitions to the function tool specification.
/// A repeated name keeps the first definition.
pub fn tools_to_openai_spec(tools: &[ToolDefinition]) -> Vec<Value> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        let name = sanitize_function_name(&tool.name);
        if !tool_names.insert(name.clone()) {
            tracing::warn!("duplicate tool name {}, skipping", tool.name);
            continue;
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": tool.description,
                "parameters": normalize_input_schema(&tool.input_schema),
            }
        }));
    }

    result
}

/// Convert a chat completions response to canonical content, skipping unknown parts
pub fn openai_response_to_content(
    response: &Value,
    vendor: VendorName,
) -> ProviderResult<Vec<ContentBlock>> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ProviderError::InvalidResponse("no message in response choices".to_string()))?;
    let mut content = Vec::new();

    if let Some(reasoning) = original.get("reasoning_content").and_then(|r| r.as_str()) {
        if !reasoning.is_empty() {
            content.push(ContentBlock::thinking(reasoning, synthetic_signature(vendor)));
        }
    }

    match original.get("content") {
        Some(Value::String(text)) if !text.is_empty() => content.push(ContentBlock::text(text)),
        Some(Value::Array(parts)) => {
            for part in parts {
                match (part.get("type").and_then(|t| t.as_str()), part.get("text")) {
                    (Some("text"), Some(Value::String(text))) => {
                        content.push(ContentBlock::text(text))
                    }
                    (kind, _) => tracing::debug!(?kind, "skipping unrecognized content part"),
                }
            }
        }
        _ => {}
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            if !is_valid_function_name(name) {
                tracing::warn!(
                    "function name '{}' has characters outside [a-zA-Z0-9_-]",
                    name
                );
            }
            content.push(ContentBlock::tool_use(id, name, arguments));
        }
    }

    Ok(content)
}

pub fn get_openai_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let input_tokens = token_count(usage, "prompt_tokens");
    let output_tokens = token_count(usage, "completion_tokens");
    let total_tokens = token_count(usage, "total_tokens").or_else(|| match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

pub fn get_openai_stop_reason(response: &Value) -> Option<String> {
    response["choices"][0]["finish_reason"]
        .as_str()
        .map(String::from)
}
