pub mod commands;

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::bot::state::InMemorySessionStore;
use crate::bot::{messages, BotContext, ConversationSettings};
use crate::cli::commands::Commands;
use crate::config::{AppConfig, ConfigError};
use crate::db::{get_connection, DuckDbStore, ProfileStore, StoreError};
use crate::dispatch::ReportDispatcher;
use crate::llm::ProviderFactory;
use crate::scheduler::BroadcastScheduler;
use crate::summary::{LlmSummarizer, SummaryGenerator};
use crate::transport::{TelegramClient, TransportError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to initialize database: {0}")]
    Database(#[from] duckdb::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to initialize transport: {0}")]
    Transport(#[from] TransportError),
    #[error("Unsupported LLM provider: {0}")]
    Provider(String),
}

struct Runtime {
    store: Arc<DuckDbStore>,
    telegram: Arc<TelegramClient>,
    dispatcher: Arc<ReportDispatcher>,
}

fn build_runtime(config: &AppConfig) -> Result<Runtime, CliError> {
    config.validate()?;

    let store = Arc::new(DuckDbStore::new(get_connection(&config.database)?));
    let telegram = Arc::new(TelegramClient::new(&config.telegram)?);

    let summarizer: Option<Arc<dyn SummaryGenerator>> = if config.llm.summaries_enabled {
        let provider = ProviderFactory::create_default(&config.llm)
            .ok_or_else(|| CliError::Provider(config.llm.provider.clone()))?;
        Some(Arc::new(LlmSummarizer::new(provider, &config.llm)))
    } else {
        info!("Personalized summaries disabled");
        None
    };

    let dispatcher = Arc::new(ReportDispatcher::new(
        telegram.clone(),
        summarizer,
        config.reports.category_links()?,
    ));

    Ok(Runtime {
        store,
        telegram,
        dispatcher,
    })
}

pub async fn run_cli(command: Commands, config: AppConfig) -> Result<(), CliError> {
    match command {
        Commands::Serve => serve(config).await,
        Commands::Users => {
            let store = DuckDbStore::new(get_connection(&config.database)?);
            let profiles = store.list_all().await?;
            println!("{}", messages::format_profiles(&profiles));
            Ok(())
        }
        Commands::Reports { category } => {
            let store = DuckDbStore::new(get_connection(&config.database)?);
            let reports = match category {
                Some(category) => store.reports_by_category(category).await?,
                None => store.list_reports()?,
            };

            if reports.is_empty() {
                println!("No reports found.");
            } else {
                println!(
                    "{:<4} | {:<12} | {:<32} | {:<16} | {}",
                    "ID", "Category", "Title", "Source", "File"
                );
                println!("{:-<4}-+-{:-<12}-+-{:-<32}-+-{:-<16}-+-{:-<24}", "", "", "", "", "");
                for r in reports {
                    println!(
                        "{:<4} | {:<12} | {:<32} | {:<16} | {}",
                        r.id, r.category, r.title, r.source, r.file_path
                    );
                }
            }
            Ok(())
        }
        Commands::Broadcast => {
            let runtime = build_runtime(&config)?;
            let scheduler = BroadcastScheduler::new(
                runtime.store,
                runtime.dispatcher,
                config.scheduler.interval(),
                config.scheduler.retry_delay(),
            );
            let delivered = scheduler.run_once().await?;
            println!("Delivered {} reports", delivered);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), CliError> {
    info!("Starting report bot...");
    let runtime = build_runtime(&config)?;

    let scheduler = BroadcastScheduler::new(
        runtime.store.clone(),
        runtime.dispatcher.clone(),
        config.scheduler.interval(),
        config.scheduler.retry_delay(),
    );
    tokio::spawn(scheduler.run());
    info!("Regular reports task started");

    let bot = Arc::new(BotContext::new(
        runtime.store,
        runtime.telegram.clone(),
        runtime.dispatcher,
        Arc::new(InMemorySessionStore::new()),
        ConversationSettings {
            profile_offer_delay: config.profile_offer_delay(),
        },
    ));

    tokio::select! {
        _ = runtime.telegram.poll(bot) => {}
        _ = tokio::signal::ctrl_c() => info!("Bot stopped manually"),
    }
    Ok(())
}
