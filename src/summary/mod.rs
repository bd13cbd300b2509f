use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm::{models::{ChatOptions, Message}, LlmProvider};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a business analyst specializing in creating personalized report summaries.
Focus on aspects most relevant to the user's business profile and industry.
Keep summaries concise and actionable.";

/// Produces a personalized summary, or nothing. Absence is a normal outcome.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn summarize(
        &self,
        report_text: &str,
        user_description: &str,
        industry: &str,
    ) -> Option<String>;
}

pub struct LlmSummarizer {
    provider: Arc<dyn LlmProvider>,
    options: ChatOptions,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            options: ChatOptions {
                model: Some(config.model.clone()),
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
                system_prompt: Some(SUMMARY_SYSTEM_PROMPT.to_string()),
            },
        }
    }
}

pub fn build_prompt(report_text: &str, user_description: &str, industry: &str) -> String {
    format!(
        "Industry: {industry}\n\
         Business Description: {user_description}\n\n\
         Report Content:\n{report_text}\n\n\
         Create a concise, personalized summary focusing on aspects relevant \
         to this specific business and industry. Include actionable insights."
    )
}

#[async_trait]
impl SummaryGenerator for LlmSummarizer {
    async fn summarize(
        &self,
        report_text: &str,
        user_description: &str,
        industry: &str,
    ) -> Option<String> {
        let prompt = build_prompt(report_text, user_description, industry);

        match self.provider.chat(&[Message::user(prompt)], self.options.clone()).await {
            Ok(response) => {
                let summary = response.content.trim();
                if summary.is_empty() {
                    debug!("{} returned an empty summary", self.provider.name());
                    None
                } else {
                    Some(summary.to_string())
                }
            }
            Err(e) => {
                warn!("Summary generation via {} failed: {}", self.provider.name(), e);
                None
            }
        }
    }
}
