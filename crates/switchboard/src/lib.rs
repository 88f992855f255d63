pub mod configuration;
pub mod errors;
pub mod models;
pub mod providers;
