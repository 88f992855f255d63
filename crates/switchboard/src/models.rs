//! These models represent the objects passed between the caller and the adapters
//!
//! There are several different related formats we need to interact with:
//! - openai chat completion messages/tools (also spoken by deepseek)
//! - anthropic messages/tools
//! - google gemini contents/function declarations
//!
//! These overlap to varying degrees. Adapters always immediately convert the vendor
//! formats into the internal structs using to/from helpers in `providers::formats`.
//! Because of the need for compatibility, the internal models are not an exact match
//! to any of these formats.
pub mod chat;
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
