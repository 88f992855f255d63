use config::{Config, Environment};
use serde::Deserialize;

use crate::errors::{to_env_var, ConfigError};
use crate::providers::configs::{VendorConfig, VendorName};
use crate::providers::factory::ProviderRegistry;

/// Vendor credentials read from `SWITCHBOARD_<VENDOR>__<FIELD>` variables
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub openai: Option<VendorConfig>,
    #[serde(default)]
    pub deepseek: Option<VendorConfig>,
    #[serde(default)]
    pub anthropic: Option<VendorConfig>,
    #[serde(default)]
    pub google: Option<VendorConfig>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SWITCHBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&missing_field_path(&error_str)),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn vendor(&self, vendor: VendorName) -> Option<&VendorConfig> {
        match vendor {
            VendorName::OpenAi => self.openai.as_ref(),
            VendorName::DeepSeek => self.deepseek.as_ref(),
            VendorName::Anthropic => self.anthropic.as_ref(),
            VendorName::Google => self.google.as_ref(),
        }
    }

    /// Push every configured vendor into `registry`, returning the vendors registered
    pub fn register(&self, registry: &ProviderRegistry) -> Vec<VendorName> {
        let mut registered = Vec::new();
        for (vendor, config) in [
            (VendorName::OpenAi, &self.openai),
            (VendorName::DeepSeek, &self.deepseek),
            (VendorName::Anthropic, &self.anthropic),
            (VendorName::Google, &self.google),
        ] {
            if let Some(config) = config {
                registry.set_vendor_config(vendor, config.clone());
                registered.push(vendor);
            }
        }
        tracing::info!(?registered, "registered vendor configurations");
        registered
    }
}

/// "missing field `api_key` for key `openai`" becomes `openai.api_key`
fn missing_field_path(message: &str) -> String {
    let mut quoted = message.split('`').skip(1).step_by(2);
    let field = quoted.next().unwrap_or_default();
    match quoted.next() {
        Some(key) if !key.is_empty() => format!("{}.{}", key, field),
        _ => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("SWITCHBOARD_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_empty_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert!(settings.openai.is_none());
        assert!(settings.deepseek.is_none());
        assert!(settings.anthropic.is_none());
        assert!(settings.google.is_none());
    }

    #[test]
    #[serial]
    fn test_vendor_settings() {
        clean_env();
        env::set_var("SWITCHBOARD_ANTHROPIC__API_KEY", "sk-ant-test");
        env::set_var("SWITCHBOARD_ANTHROPIC__BASE_URL", "https://proxy.internal/anthropic");
        env::set_var("SWITCHBOARD_OPENAI__API_KEY", "sk-test");
        env::set_var("SWITCHBOARD_OPENAI__ORGANIZATION_ID", "org-123");

        let settings = Settings::new().unwrap();
        let anthropic = settings.vendor(VendorName::Anthropic).unwrap();
        assert_eq!(anthropic.api_key, "sk-ant-test");
        assert_eq!(
            anthropic.base_url.as_deref(),
            Some("https://proxy.internal/anthropic")
        );
        let openai = settings.openai.as_ref().unwrap();
        assert_eq!(openai.organization_id.as_deref(), Some("org-123"));
        assert!(openai.headers.is_empty());
        assert!(settings.google.is_none());

        // Clean up
        env::remove_var("SWITCHBOARD_ANTHROPIC__API_KEY");
        env::remove_var("SWITCHBOARD_ANTHROPIC__BASE_URL");
        env::remove_var("SWITCHBOARD_OPENAI__API_KEY");
        env::remove_var("SWITCHBOARD_OPENAI__ORGANIZATION_ID");
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();
        env::set_var("SWITCHBOARD_GOOGLE__BASE_URL", "https://gemini.proxy");

        match Settings::new() {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert!(env_var.starts_with("SWITCHBOARD_"));
                assert!(env_var.ends_with("API_KEY"));
            }
            other => panic!("expected a missing variable, got {:?}", other),
        }

        // Clean up
        env::remove_var("SWITCHBOARD_GOOGLE__BASE_URL");
    }

    #[test]
    #[serial]
    fn test_register() {
        clean_env();
        env::set_var("SWITCHBOARD_DEEPSEEK__API_KEY", "ds-key");

        let registry = ProviderRegistry::new();
        let registered = Settings::new().unwrap().register(&registry);
        assert_eq!(registered, vec![VendorName::DeepSeek]);
        assert_eq!(
            registry.vendor_config(VendorName::DeepSeek).unwrap().api_key,
            "ds-key"
        );
        assert!(!registry.is_configured(VendorName::OpenAi));

        // Clean up
        env::remove_var("SWITCHBOARD_DEEPSEEK__API_KEY");
    }

    #[test]
    fn test_missing_field_path() {
        assert_eq!(
            missing_field_path("missing field `api_key` for key `google`"),
            "google.api_key"
        );
        assert_eq!(missing_field_path("missing field `api_key`"), "api_key");
    }
}
