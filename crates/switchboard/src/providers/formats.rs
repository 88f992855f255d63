//! Translation between the canonical content model and each vendor's wire format
pub mod anthropic;
pub mod google;
pub mod openai;

use super::configs::{ModelConfig, UnsupportedContentPolicy, VendorName};

/// What the target vendor and model accept, and what to do with the rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingContext {
    pub vendor: VendorName,
    /// Whether image blocks may be sent at all
    pub images: bool,
    pub policy: UnsupportedContentPolicy,
}

impl MappingContext {
    /// Images are only sent when both the vendor and the model accept them
    pub fn new(vendor: VendorName, model: &ModelConfig, vendor_accepts_images: bool) -> Self {
        Self {
            vendor,
            images: vendor_accepts_images && model.is_vision_capable,
            policy: model.unsupported_content,
        }
    }
}
