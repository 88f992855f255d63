use thiserror::Error;

use crate::providers::configs::VendorName;

/// Returned by `send_mcp_chat` on every vendor. Tool execution belongs to the caller.
pub const MCP_NOT_SUPPORTED_MESSAGE: &str =
    "MCP tool execution is not supported by this adapter; execute tools in the calling application and send the results back as tool_result content";

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No configuration set for vendor: {0}")]
    ConfigurationMissing(VendorName),

    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Request failed: {status} - {body}")]
    RequestFailed {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a dotted config path such as `openai.api_key` to the variable that sets it.
pub fn to_env_var(field_path: &str) -> String {
    let path = field_path.trim_matches('`');
    format!(
        "SWITCHBOARD_{}",
        path.split('.')
            .map(|part| part.to_uppercase())
            .collect::<Vec<_>>()
            .join("__")
    )
}
