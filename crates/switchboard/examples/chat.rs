use anyhow::Result;
use dotenv::dotenv;
use switchboard::{
    configuration::Settings,
    models::chat::Chat,
    providers::{
        configs::{ModelConfig, VendorName},
        factory::{get_provider, global_registry},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load SWITCHBOARD_* variables from .env file
    dotenv().ok();

    let registered = Settings::new()?.register(global_registry());
    let vendor = std::env::var("SWITCHBOARD_VENDOR")
        .map(|name| VendorName::from_name(&name))
        .unwrap_or(Ok(VendorName::Anthropic))?;
    let model = std::env::var("SWITCHBOARD_MODEL")
        .expect("SWITCHBOARD_MODEL environment variable is required");
    println!("Configured vendors: {:?}", registered);

    let provider = get_provider(vendor, ModelConfig::new(model))?;

    let chat = Chat::new("", "Tell me a short joke about programming.")
        .with_system_prompt("You are a helpful assistant.");
    let response = provider.send_chat(&chat, None).await?;

    println!("\nResponse from AI:");
    println!("---------------");
    for content in &response.content {
        dbg!(content);
    }
    println!("\nToken Usage:");
    println!("------------");
    println!("Input tokens: {:?}", response.token_usage.input_tokens);
    println!("Output tokens: {:?}", response.token_usage.output_tokens);
    println!("Total tokens: {:?}", response.token_usage.total_tokens);

    Ok(())
}
