use std::collections::HashMap;

use serde_json::{json, Map, Value};

use super::MappingContext;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::content::ContentBlock;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::ToolDefinition;
use crate::providers::base::Usage;
use crate::providers::configs::VendorName;
use crate::providers::utils::{
    fallback_text, is_synthetic_signature, normalize_input_schema, parse_tool_input,
    reject_unsupported, synthetic_signature, token_count,
};

/// JSON schema keywords the function declaration schema rejects
const UNSUPPORTED_SCHEMA_KEYWORDS: [&str; 3] = ["$schema", "$id", "additionalProperties"];

/// Convert internal messages to gemini `contents`.
///
/// A thinking block with no text and a real signature stands for a signature gemini
/// attached to the following part, and goes back out on that part.
/// Function responses are named after the call they answer.
pub fn messages_to_google_spec(
    messages: &[Message],
    context: &MappingContext,
) -> ProviderResult<Vec<Value>> {
    let mut contents = Vec::new();
    let mut call_names: HashMap<&str, &str> = HashMap::new();

    for message in messages {
        let mut parts = Vec::new();
        let mut pending_signature: Option<&str> = None;

        for content in &message.content {
            let part = match content {
                ContentBlock::Text(text) => json!({"text": text.text}),
                ContentBlock::ImageData(image) if context.images => {
                    json!({"inlineData": {"mimeType": image.mime_type, "data": image.data}})
                }
                ContentBlock::Thinking(thinking)
                    if thinking.thinking.is_empty() && !is_synthetic_signature(&thinking.signature) =>
                {
                    pending_signature = Some(thinking.signature.as_str());
                    continue;
                }
                ContentBlock::Thinking(thinking) => {
                    let mut part = json!({"text": thinking.thinking, "thought": true});
                    if !is_synthetic_signature(&thinking.signature) {
                        part["thoughtSignature"] = json!(thinking.signature);
                    }
                    part
                }
                ContentBlock::ToolUse(tool_use) => {
                    call_names.insert(tool_use.id.as_str(), tool_use.name.as_str());
                    json!({
                        "functionCall": {
                            "name": tool_use.name,
                            "args": parse_tool_input(&tool_use.input),
                        }
                    })
                }
                ContentBlock::ToolResult(result) => {
                    let name = result
                        .name
                        .as_deref()
                        .or_else(|| call_names.get(result.tool_use_id.as_str()).copied())
                        .unwrap_or(&result.tool_use_id);
                    let output = serde_json::from_str::<Value>(&result.content)
                        .unwrap_or_else(|_| json!(result.content));
                    let key = if result.is_error { "error" } else { "content" };
                    let mut response = Map::new();
                    response.insert(key.to_string(), output);
                    json!({
                        "functionResponse": {
                            "name": name,
                            "response": response,
                        }
                    })
                }
                ContentBlock::Unknown => {
                    tracing::debug!("skipping unknown content block");
                    continue;
                }
                other => {
                    reject_unsupported(other, context.vendor, context.policy)?;
                    continue;
                }
            };
            parts.push(with_signature(part, pending_signature.take()));
        }

        // a trailing signature has no part to ride on
        if let Some(signature) = pending_signature {
            parts.push(json!({"text": "", "thought": true, "thoughtSignature": signature}));
        }

        if parts.is_empty() {
            parts.push(json!({"text": fallback_text(&message.content)}));
        }

        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        contents.push(json!({"role": role, "parts": parts}));
    }

    Ok(contents)
}

fn with_signature(mut part: Value, signature: Option<&str>) -> Value {
    if let Some(signature) = signature {
        part["thoughtSignature"] = json!(signature);
    }
    part
}

/// Recursively remove keywords that gemini does not accept in parameter schemas
fn strip_schema_keywords(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            for keyword in UNSUPPORTED_SCHEMA_KEYWORDS {
                map.remove(keyword);
            }
            for value in map.values_mut() {
                strip_schema_keywords(value);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_schema_keywords),
        _ => {}
    }
}

pub fn tools_to_google_spec(tools: &[ToolDefinition]) -> Vec<Value> {
    if tools.is_empty() {
        return Vec::new();
    }

    let declarations: Vec<Value> = tools
        .iter()
        .map(|tool| {
            let mut parameters = normalize_input_schema(&tool.input_schema);
            strip_schema_keywords(&mut parameters);
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": parameters,
            })
        })
        .collect();

    vec![json!({"functionDeclarations": declarations})]
}

fn first_candidate(response: &Value) -> ProviderResult<&Value> {
    response
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| {
            let feedback = response.get("promptFeedback").cloned().unwrap_or(Value::Null);
            ProviderError::InvalidResponse(format!("no candidates in response: {}", feedback))
        })
}

/// Convert a `generateContent` response to canonical content, skipping unknown parts.
/// A signature carried by a non-thought part becomes an empty thinking block placed
/// right before that part.
pub fn google_response_to_content(response: &Value) -> ProviderResult<Vec<ContentBlock>> {
    let candidate = first_candidate(response)?;
    let empty = Vec::new();
    let parts = candidate["content"]["parts"].as_array().unwrap_or(&empty);

    let mut content = Vec::new();
    for part in parts {
        let signature = part
            .get("thoughtSignature")
            .and_then(|s| s.as_str())
            .filter(|s| !s.is_empty());
        let is_thought = part.get("thought").and_then(|t| t.as_bool()).unwrap_or(false);

        if let (Some(text), true) = (part.get("text").and_then(|t| t.as_str()), is_thought) {
            let signature = signature
                .map(String::from)
                .unwrap_or_else(|| synthetic_signature(VendorName::Google));
            content.push(ContentBlock::thinking(text, signature));
            continue;
        }

        let block = if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            ContentBlock::text(text)
        } else if let Some(call) = part.get("functionCall") {
            let name = call["name"].as_str().unwrap_or_default();
            let id = call["id"].as_str().unwrap_or(name);
            let args = call.get("args").cloned().unwrap_or_else(|| json!({}));
            ContentBlock::tool_use(id, name, args.to_string())
        } else if let Some(data) = part.get("inlineData") {
            ContentBlock::image_data(
                data["data"].as_str().unwrap_or_default(),
                data["mimeType"].as_str().unwrap_or("image/png"),
            )
        } else {
            let keys: Vec<&String> = part.as_object().map(Map::keys).into_iter().flatten().collect();
            tracing::debug!(?keys, "skipping unrecognized part");
            continue;
        };

        if let Some(signature) = signature {
            content.push(ContentBlock::thinking("", signature));
        }
        content.push(block);
    }

    Ok(content)
}

/// Thought tokens are billed as output
pub fn get_google_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usageMetadata") else {
        return Usage::default();
    };

    let input_tokens = token_count(usage, "promptTokenCount");
    let output_tokens = match (
        token_count(usage, "candidatesTokenCount"),
        token_count(usage, "thoughtsTokenCount"),
    ) {
        (Some(candidates), thoughts) => Some(candidates + thoughts.unwrap_or(0)),
        (None, thoughts) => thoughts,
    };
    let total_tokens = token_count(usage, "totalTokenCount");

    Usage::new(input_tokens, output_tokens, total_tokens)
}

pub fn get_google_stop_reason(response: &Value) -> Option<String> {
    response["candidates"][0]["finishReason"]
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::UnsupportedContentPolicy;

    fn context(images: bool) -> MappingContext {
        MappingContext {
            vendor: VendorName::Google,
            images,
            policy: UnsupportedContentPolicy::Drop,
        }
    }

    fn as_response(spec: &[Value]) -> Value {
        json!({"candidates": [{"content": spec[0].clone(), "finishReason": "STOP"}]})
    }

    #[test]
    fn test_round_trip_text_and_thinking() -> ProviderResult<()> {
        let message = Message::assistant()
            .with_thinking("Work it out.", "CiQB0e2Kb")
            .with_text("42");
        let spec = messages_to_google_spec(&[message.clone()], &context(false))?;

        assert_eq!(spec[0]["role"], "model");
        assert_eq!(spec[0]["parts"][0]["thought"], true);
        assert_eq!(spec[0]["parts"][0]["thoughtSignature"], "CiQB0e2Kb");

        let content = google_response_to_content(&as_response(&spec))?;
        assert_eq!(content, message.content);
        Ok(())
    }

    #[test]
    fn test_round_trip_tool_use() -> ProviderResult<()> {
        let message = Message::assistant().with_tool_use("lookup", "lookup", "{\"q\":\"rust\"}");
        let spec = messages_to_google_spec(&[message.clone()], &context(false))?;
        assert_eq!(spec[0]["parts"][0]["functionCall"]["args"], json!({"q": "rust"}));

        let content = google_response_to_content(&as_response(&spec))?;
        assert_eq!(content, message.content);
        Ok(())
    }

    #[test]
    fn test_image_url_is_not_fetched() -> ProviderResult<()> {
        let message = Message::user().with_image_url("https://example.com/cat.png");
        let spec = messages_to_google_spec(&[message], &context(true))?;
        let parts = spec[0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0]["text"].as_str().unwrap().contains("image_url"));
        Ok(())
    }

    #[test]
    fn test_inline_image_with_vision() -> ProviderResult<()> {
        let message = Message::user()
            .with_image_data("aGVsbG8=", "image/webp")
            .with_text("Describe");
        let spec = messages_to_google_spec(&[message], &context(true))?;
        assert_eq!(spec[0]["parts"][0]["inlineData"]["mimeType"], "image/webp");
        assert_eq!(spec[0]["parts"][1]["text"], "Describe");
        Ok(())
    }

    #[test]
    fn test_redacted_thinking_fail_policy() {
        let message = Message::assistant().with_content(ContentBlock::redacted_thinking("x"));
        let context = MappingContext {
            policy: UnsupportedContentPolicy::Fail,
            ..context(false)
        };
        let result = messages_to_google_spec(&[message], &context);
        assert!(matches!(result, Err(ProviderError::NotSupported(_))));
    }

    #[test]
    fn test_signed_function_call_round_trip() -> ProviderResult<()> {
        let response = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Checking the forecast", "thought": true},
                    {
                        "functionCall": {"name": "get_weather", "args": {"city": "Lima"}},
                        "thoughtSignature": "CsQCAdHtim9"
                    }
                ]},
                "finishReason": "STOP"
            }]
        });

        let content = google_response_to_content(&response)?;
        assert_eq!(
            content,
            vec![
                ContentBlock::thinking("Checking the forecast", "synthetic:google"),
                ContentBlock::thinking("", "CsQCAdHtim9"),
                ContentBlock::tool_use("get_weather", "get_weather", "{\"city\":\"Lima\"}"),
            ]
        );

        let message = Message::assistant().with_content(content[1].clone()).with_content(content[2].clone());
        let spec = messages_to_google_spec(&[message.clone()], &context(false))?;
        let parts = spec[0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["thoughtSignature"], "CsQCAdHtim9");
        assert_eq!(parts[0]["functionCall"]["name"], "get_weather");

        assert_eq!(google_response_to_content(&as_response(&spec))?, message.content);
        Ok(())
    }

    #[test]
    fn test_signed_text_and_empty_signature() -> ProviderResult<()> {
        let response = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "considering", "thought": true, "thoughtSignature": ""},
                    {"text": "Sunny", "thoughtSignature": "Ei4KLAG"}
                ]}
            }]
        });

        let content = google_response_to_content(&response)?;
        assert_eq!(content[0].as_thinking().unwrap().signature, "synthetic:google");
        assert_eq!(content[1], ContentBlock::thinking("", "Ei4KLAG"));
        assert_eq!(content[2].as_text(), Some("Sunny"));

        // a signature with nothing after it still goes out
        let message = Message::assistant().with_thinking("", "Ei4KLAG");
        let spec = messages_to_google_spec(&[message], &context(false))?;
        assert_eq!(
            spec[0]["parts"],
            json!([{"text": "", "thought": true, "thoughtSignature": "Ei4KLAG"}])
        );
        Ok(())
    }

    #[test]
    fn test_tool_result_named_after_earlier_call() -> ProviderResult<()> {
        // history produced by a chat completions vendor
        let history = vec![
            Message::user().with_text("Weather in Lima?"),
            Message::assistant().with_tool_use("call_abc", "get_weather", "{\"city\":\"Lima\"}"),
            Message::user().with_tool_result("call_abc", "{\"temp\": 19}"),
        ];

        let spec = messages_to_google_spec(&history, &context(false))?;
        assert_eq!(spec[1]["parts"][0]["functionCall"]["name"], "get_weather");
        assert_eq!(spec[2]["parts"][0]["functionResponse"]["name"], "get_weather");
        assert_eq!(spec[2]["parts"][0]["functionResponse"]["response"]["content"]["temp"], 19);
        Ok(())
    }

    #[test]
    fn test_tool_result_uses_name() -> ProviderResult<()> {
        let mut message = Message::user();
        message.content.push(ContentBlock::ToolResult(
            crate::models::content::ToolResultContent {
                tool_use_id: "call_1".to_string(),
                name: Some("lookup".to_string()),
                content: "{\"hits\": 3}".to_string(),
                is_error: false,
            },
        ));
        message = message.with_tool_result("other", "plain text");

        let spec = messages_to_google_spec(&[message], &context(false))?;
        let parts = spec[0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["functionResponse"]["name"], "lookup");
        assert_eq!(parts[0]["functionResponse"]["response"]["content"]["hits"], 3);
        assert_eq!(parts[1]["functionResponse"]["name"], "other");
        assert_eq!(parts[1]["functionResponse"]["response"]["content"], "plain text");
        Ok(())
    }

    #[test]
    fn test_tools_to_google_spec() {
        let tools = vec![ToolDefinition::new(
            "search",
            "Search the web",
            json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "filters": {"type": "object", "additionalProperties": false, "properties": {}}
                }
            }),
        )];
        let spec = tools_to_google_spec(&tools);
        let parameters = &spec[0]["functionDeclarations"][0]["parameters"];
        assert!(parameters.get("$schema").is_none());
        assert!(parameters.get("additionalProperties").is_none());
        assert!(parameters["properties"]["filters"].get("additionalProperties").is_none());

        assert!(tools_to_google_spec(&[]).is_empty());
    }

    #[test]
    fn test_response_parts() -> ProviderResult<()> {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "planning", "thought": true},
                        {"executableCode": {"language": "PYTHON", "code": "print(1)"}},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                        {"text": "Here you go"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 10,
                "candidatesTokenCount": 5,
                "thoughtsTokenCount": 7,
                "totalTokenCount": 22
            }
        });

        let content = google_response_to_content(&response)?;
        assert_eq!(content.len(), 3);
        assert_eq!(content[0].as_thinking().unwrap().signature, "synthetic:google");
        assert_eq!(content[1], ContentBlock::image_data("iVBORw0KGgo=", "image/png"));
        assert_eq!(content[2].as_text(), Some("Here you go"));

        assert_eq!(get_google_usage(&response), Usage::new(Some(10), Some(12), Some(22)));
        assert_eq!(get_google_stop_reason(&response).as_deref(), Some("STOP"));
        Ok(())
    }

    #[test]
    fn test_blocked_prompt_is_invalid_response() {
        let response = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = google_response_to_content(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
