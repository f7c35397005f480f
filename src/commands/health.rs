use crate::config::ClientConfig;
use crate::error::AppError;
use crate::services::inference_client::HttpInferenceClient;
use colored::Colorize;

pub async fn health(config: &ClientConfig) -> Result<(), AppError> {
    let client = HttpInferenceClient::new(config)?;
    let health = client.health().await?;
    println!("{} {} ({})", "ok".green().bold(), health.message, config.endpoint);
    Ok(())
}
