use std::collections::HashMap;
use std::sync::RwLock;

use lazy_static::lazy_static;

use super::{
    anthropic::AnthropicProvider,
    base::Provider,
    configs::{ModelConfig, VendorConfig, VendorName},
    deepseek::DeepSeekProvider,
    google::GoogleProvider,
    openai::OpenAiProvider,
};
use crate::errors::{ProviderError, ProviderResult};

/// Vendor configurations, handed to a new adapter on every lookup
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    configs: RwLock<HashMap<VendorName, VendorConfig>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the configuration of a vendor
    pub fn set_vendor_config(&self, vendor: VendorName, config: VendorConfig) {
        let mut configs = self
            .configs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if configs.insert(vendor, config).is_some() {
            tracing::debug!(%vendor, "replaced vendor configuration");
        }
    }

    pub fn vendor_config(&self, vendor: VendorName) -> Option<VendorConfig> {
        self.configs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&vendor)
            .cloned()
    }

    pub fn is_configured(&self, vendor: VendorName) -> bool {
        self.vendor_config(vendor).is_some()
    }

    pub fn get_provider(
        &self,
        vendor: VendorName,
        model: ModelConfig,
    ) -> ProviderResult<Box<dyn Provider + Send + Sync>> {
        let config = self
            .vendor_config(vendor)
            .ok_or(ProviderError::ConfigurationMissing(vendor))?;

        match vendor {
            VendorName::OpenAi => Ok(Box::new(OpenAiProvider::new(config, model)?)),
            VendorName::DeepSeek => Ok(Box::new(DeepSeekProvider::new(config, model)?)),
            VendorName::Anthropic => Ok(Box::new(AnthropicProvider::new(config, model)?)),
            VendorName::Google => Ok(Box::new(GoogleProvider::new(config, model)?)),
        }
    }

    /// Look a vendor up by its name, e.g. `"anthropic"`
    pub fn get_provider_by_name(
        &self,
        vendor: &str,
        model: ModelConfig,
    ) -> ProviderResult<Box<dyn Provider + Send + Sync>> {
        self.get_provider(VendorName::from_name(vendor)?, model)
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: ProviderRegistry = ProviderRegistry::new();
}

/// The process wide registry, empty until configured
pub fn global_registry() -> &'static ProviderRegistry {
    &GLOBAL_REGISTRY
}

pub fn set_vendor_config(vendor: VendorName, config: VendorConfig) {
    global_registry().set_vendor_config(vendor, config);
}

pub fn get_provider(
    vendor: VendorName,
    model: ModelConfig,
) -> ProviderResult<Box<dyn Provider + Send + Sync>> {
    global_registry().get_provider(vendor, model)
}
