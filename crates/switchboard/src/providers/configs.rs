use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{ProviderError, ProviderResult};

/// The vendors an adapter exists for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VendorName {
    OpenAi,
    DeepSeek,
    Anthropic,
    Google,
}

impl VendorName {
    pub fn from_name(name: &str) -> ProviderResult<Self> {
        name.trim()
            .parse()
            .map_err(|_| ProviderError::UnknownVendor(name.to_string()))
    }
}

/// Credentials and connection overrides for one vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorConfig {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Extra headers attached to every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl VendorConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_organization_id<S: Into<String>>(mut self, organization_id: S) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// The configured base url without a trailing slash, or the vendor default
    pub fn host(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

/// What a mapper does with a content block the vendor or model cannot accept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedContentPolicy {
    #[default]
    Drop,
    Fail,
}

/// Static metadata for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model id as the vendor API expects it
    pub name: String,
    #[serde(default)]
    pub is_vision_capable: bool,
    #[serde(default)]
    pub is_image_generation_capable: bool,
    #[serde(default)]
    pub is_thinking_capable: bool,
    /// Cost per million input tokens
    #[serde(default)]
    pub input_token_cost: Option<f64>,
    /// Cost per million output tokens
    #[serde(default)]
    pub output_token_cost: Option<f64>,
    #[serde(default)]
    pub unsupported_content: UnsupportedContentPolicy,
}

impl ModelConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_vision(mut self, enabled: bool) -> Self {
        self.is_vision_capable = enabled;
        self
    }

    pub fn with_image_generation(mut self, enabled: bool) -> Self {
        self.is_image_generation_capable = enabled;
        self
    }

    pub fn with_thinking(mut self, enabled: bool) -> Self {
        self.is_thinking_capable = enabled;
        self
    }

    pub fn with_costs(mut self, input_token_cost: f64, output_token_cost: f64) -> Self {
        self.input_token_cost = Some(input_token_cost);
        self.output_token_cost = Some(output_token_cost);
        self
    }

    pub fn with_unsupported_content(mut self, policy: UnsupportedContentPolicy) -> Self {
        self.unsupported_content = policy;
        self
    }
}
