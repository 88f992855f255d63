pub mod anthropic;
pub mod base;
pub mod configs;
pub mod cost;
pub mod deepseek;
pub mod factory;
pub mod formats;
pub mod google;
pub mod openai;
pub mod utils;

#[cfg(test)]
pub mod mock;
