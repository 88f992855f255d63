use regex::Regex;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use super::configs::{UnsupportedContentPolicy, VendorConfig, VendorName};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::content::ContentBlock;
use crate::models::tool::ToolDefinition;

const SYNTHETIC_SIGNATURE_PREFIX: &str = "synthetic:";

/// Schema used in place of one that cannot be parsed or has no `type`
pub fn fallback_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Turn a tool input schema given as text or as an object into a usable object schema
pub fn normalize_input_schema(schema: &Value) -> Value {
    let parsed = match schema {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("tool input schema is not valid json, using fallback: {}", e);
                return fallback_schema();
            }
        },
        other => other.clone(),
    };

    if parsed.is_object() && parsed.get("type").is_some() {
        parsed
    } else {
        tracing::warn!("tool input schema has no type field, using fallback");
        fallback_schema()
    }
}

pub fn normalize_tool(tool: &ToolDefinition) -> ToolDefinition {
    ToolDefinition {
        name: tool.name.clone(),
        description: tool.description.clone(),
        input_schema: normalize_input_schema(&tool.input_schema),
    }
}

/// Deterministic signature for reasoning a vendor returned unsigned
pub fn synthetic_signature(vendor: VendorName) -> String {
    format!("{}{}", SYNTHETIC_SIGNATURE_PREFIX, vendor)
}

/// Synthetic signatures identify the producing adapter only; no vendor can verify them
pub fn is_synthetic_signature(signature: &str) -> bool {
    signature.is_empty() || signature.starts_with(SYNTHETIC_SIGNATURE_PREFIX)
}

/// Text stand-in for a message whose content was entirely filtered out
pub fn fallback_text(content: &[ContentBlock]) -> String {
    serde_json::to_string(content).unwrap_or_else(|_| "[]".to_string())
}

/// Apply the unsupported content policy to a block the vendor cannot accept
pub fn reject_unsupported(
    block: &ContentBlock,
    vendor: VendorName,
    policy: UnsupportedContentPolicy,
) -> ProviderResult<()> {
    match policy {
        UnsupportedContentPolicy::Drop => {
            tracing::debug!(%vendor, kind = block.kind(), "dropping unsupported content block");
            Ok(())
        }
        UnsupportedContentPolicy::Fail => Err(ProviderError::NotSupported(format!(
            "{} content is not supported by {}",
            block.kind(),
            vendor
        ))),
    }
}

pub fn image_generation_not_supported(vendor: VendorName, model: &str) -> ProviderError {
    ProviderError::NotSupported(format!(
        "image generation is not supported by {} model {}",
        vendor, model
    ))
}

/// Parse serialized tool input back into an object for vendors that want structured input
pub fn parse_tool_input(input: &str) -> Value {
    if input.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str::<Value>(input) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("tool input is not valid json, sending an empty object: {}", e);
            json!({})
        }
    }
}

pub fn data_uri(mime_type: &str, data: &str) -> String {
    format!("data:{};base64,{}", mime_type, data)
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

/// Attach the caller supplied headers from the vendor config
pub fn with_custom_headers(mut request: RequestBuilder, config: &VendorConfig) -> RequestBuilder {
    for (key, value) in &config.headers {
        request = request.header(key.as_str(), value.as_str());
    }
    request
}

/// Read a vendor response, passing failures through with the vendor's own detail
pub async fn handle_response(response: Response) -> ProviderResult<Value> {
    match response.status() {
        StatusCode::OK => Ok(response.json().await?),
        status => {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "vendor request failed");
            Err(ProviderError::RequestFailed { status, body })
        }
    }
}

/// Read an optional token counter from a usage object
pub fn token_count(usage: &Value, key: &str) -> Option<u64> {
    usage.get(key).and_then(|v| v.as_u64())
}
