pub mod models;
pub mod openai;

use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::LlmConfig;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),
    #[error("Rate Limited")]
    RateLimited,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError>;
}

/// Builds the configured text-generation provider.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &LlmConfig) -> Option<Arc<dyn LlmProvider>> {
        match config.provider.as_str() {
            "openai" => Some(Arc::new(OpenAiProvider::new(
                config.api_key.clone(),
                config.api_base.clone(),
                config.model.clone(),
            ))),
            _ => None,
        }
    }
}
