use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::db::models::Category;

const DEFAULT_FINTECH_LINK: &str = "https://disk.yandex.com/d/TJtgoNkQ8aQfpw";
const DEFAULT_AUTOMOTIVE_LINK: &str = "https://disk.yandex.com/d/O5FL51jLxs9vbg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
    #[error("Unknown report category in links: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub summaries_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    #[serde(default)]
    pub links: HashMap<String, String>,
}

impl ReportsConfig {
    /// Resolves configured link keys to categories. Keys are matched
    /// case-insensitively since config sources lower-case them.
    pub fn category_links(&self) -> Result<HashMap<Category, String>, ConfigError> {
        self.links
            .iter()
            .map(|(key, link)| {
                Category::from_config_key(key)
                    .map(|category| (category, expand_env(link)))
                    .ok_or_else(|| ConfigError::UnknownCategory(key.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
    pub retry_secs: u64,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversationConfig {
    pub profile_offer_delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub reports: ReportsConfig,
    pub scheduler: SchedulerConfig,
    pub conversation: ConversationConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("telegram.token", "")?
            .set_default("telegram.api_base", "https://api.telegram.org")?
            .set_default("telegram.poll_timeout_secs", 30)?
            .set_default("llm.provider", "openai")?
            .set_default("llm.api_base", "https://api.openai.com/v1")?
            .set_default("llm.api_key", "")?
            .set_default("llm.model", "gpt-3.5-turbo")?
            .set_default("llm.max_tokens", 500)?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.summaries_enabled", true)?
            .set_default("database.path", "reports.duckdb")?
            .set_default("reports.links.fintech", DEFAULT_FINTECH_LINK)?
            .set_default("reports.links.automotive", DEFAULT_AUTOMOTIVE_LINK)?
            .set_default("scheduler.interval_secs", 86_400)?
            .set_default("scheduler.retry_secs", 300)?
            .set_default("conversation.profile_offer_delay_secs", 3)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("REPORTBOT").separator("__"))
            .set_override_option("telegram.token", std::env::var("BOT_TOKEN").ok())?
            .set_override_option("llm.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${BOT_TOKEN}
        app_config.telegram.token = expand_env(&app_config.telegram.token);
        app_config.llm.api_key = expand_env(&app_config.llm.api_key);
        app_config.database.path = expand_env(&app_config.database.path);

        Ok(app_config)
    }

    /// Both secrets are required before the bot or a broadcast starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::MissingSecret("BOT_TOKEN"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret("OPENAI_API_KEY"));
        }
        self.reports.category_links()?;
        Ok(())
    }

    pub fn profile_offer_delay(&self) -> Duration {
        Duration::from_secs(self.conversation.profile_offer_delay_secs)
    }
}

fn expand_env(val: &str) -> String {
    match val.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => val.to_string(),
    }
}
