use std::collections::HashMap;

use reportbot::config::{
    AppConfig, ConfigError, ConversationConfig, DatabaseConfig, LlmConfig, ReportsConfig,
    SchedulerConfig, TelegramConfig,
};
use reportbot::db::Category;

fn config(token: &str, api_key: &str) -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        telegram: TelegramConfig {
            token: token.to_string(),
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        },
        llm: LlmConfig {
            provider: "openai".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: api_key.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            summaries_enabled: true,
        },
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        reports: ReportsConfig {
            links: HashMap::from([("fintech".to_string(), "https://f.example".to_string())]),
        },
        scheduler: SchedulerConfig {
            interval_secs: 86_400,
            retry_secs: 300,
        },
        conversation: ConversationConfig {
            profile_offer_delay_secs: 3,
        },
    }
}

#[test]
fn missing_secrets_are_fatal() {
    assert!(matches!(
        config("", "key").validate(),
        Err(ConfigError::MissingSecret("BOT_TOKEN"))
    ));
    assert!(matches!(
        config("token", "  ").validate(),
        Err(ConfigError::MissingSecret("OPENAI_API_KEY"))
    ));
    assert!(config("token", "key").validate().is_ok());
}

#[test]
fn link_keys_match_categories_case_insensitively() {
    let reports = ReportsConfig {
        links: HashMap::from([
            ("FinTech".to_string(), "https://f.example".to_string()),
            ("automotive".to_string(), "https://a.example".to_string()),
        ]),
    };

    let links = reports.category_links().unwrap();

    assert_eq!(links.get(&Category::FinTech).map(String::as_str), Some("https://f.example"));
    assert_eq!(links.get(&Category::Automotive).map(String::as_str), Some("https://a.example"));
    assert!(!links.contains_key(&Category::Retail));
}

#[test]
fn unknown_link_category_is_rejected() {
    let mut cfg = config("token", "key");
    cfg.reports.links.insert("crypto".to_string(), "https://c.example".to_string());

    assert!(matches!(cfg.validate(), Err(ConfigError::UnknownCategory(key)) if key == "crypto"));
}

#[test]
fn defaults_apply_without_a_config_file() {
    let cfg = AppConfig::load("does-not-exist.yaml").unwrap();

    assert_eq!(cfg.scheduler.interval_secs, 86_400);
    assert_eq!(cfg.scheduler.retry_secs, 300);
    assert_eq!(cfg.conversation.profile_offer_delay_secs, 3);
    assert_eq!(cfg.llm.max_tokens, 500);

    let links = cfg.reports.category_links().unwrap();
    assert_eq!(
        links.get(&Category::FinTech).map(String::as_str),
        Some("https://disk.yandex.com/d/TJtgoNkQ8aQfpw")
    );
    assert_eq!(
        links.get(&Category::Automotive).map(String::as_str),
        Some("https://disk.yandex.com/d/O5FL51jLxs9vbg")
    );
}
