#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reportbot::bot::state::InMemorySessionStore;
use reportbot::bot::{BotContext, ConversationSettings};
use reportbot::config::DatabaseConfig;
use reportbot::db::{
    get_connection, Category, DuckDbStore, Profile, ProfileStore, Report, StoreError,
};
use reportbot::dispatch::ReportDispatcher;
use reportbot::llm::models::{ChatOptions, ChatResponse, Message};
use reportbot::llm::{LlmError, LlmProvider};
use reportbot::summary::SummaryGenerator;
use reportbot::transport::{OutboundMessage, ParseMode, Transport, TransportError};

pub const FINTECH_LINK: &str = "https://disk.yandex.com/d/TJtgoNkQ8aQfpw";
pub const AUTOMOTIVE_LINK: &str = "https://disk.yandex.com/d/O5FL51jLxs9vbg";

pub fn memory_store() -> Arc<DuckDbStore> {
    let config = DatabaseConfig {
        path: ":memory:".to_string(),
    };
    Arc::new(DuckDbStore::new(get_connection(&config).unwrap()))
}

pub fn default_links() -> std::collections::HashMap<Category, String> {
    [
        (Category::FinTech, FINTECH_LINK.to_string()),
        (Category::Automotive, AUTOMOTIVE_LINK.to_string()),
    ]
    .into_iter()
    .collect()
}

/// Records every outbound message; optionally rejects Markdown sends.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutboundMessage>>,
    pub reject_markdown: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting_markdown() -> Arc<Self> {
        Arc::new(Self {
            reject_markdown: true,
            ..Default::default()
        })
    }

    pub fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.text.clone()).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if self.reject_markdown && message.parse_mode == Some(ParseMode::Markdown) {
            return Err(TransportError::Api("can't parse entities".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Returns a fixed summary and records what it was asked.
pub struct StubSummarizer {
    pub reply: Option<String>,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl StubSummarizer {
    pub fn returning(reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SummaryGenerator for StubSummarizer {
    async fn summarize(
        &self,
        report_text: &str,
        user_description: &str,
        industry: &str,
    ) -> Option<String> {
        self.calls.lock().unwrap().push((
            report_text.to_string(),
            user_description.to_string(),
            industry.to_string(),
        ));
        self.reply.clone()
    }
}

/// LLM provider that answers with a script or an error.
pub struct ScriptedLlm {
    pub reply: Result<String, String>,
    pub seen: Mutex<Vec<(Vec<Message>, ChatOptions)>>,
}

impl ScriptedLlm {
    pub fn ok(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        self.seen.lock().unwrap().push((messages.to_vec(), options));
        match &self.reply {
            Ok(content) => Ok(ChatResponse {
                content: content.clone(),
                model: "scripted".to_string(),
                usage: None,
            }),
            Err(reason) => Err(LlmError::Api(reason.clone())),
        }
    }
}

/// Wraps a real store and injects failures.
pub struct FlakyStore {
    pub inner: Arc<DuckDbStore>,
    pub fail_upsert: bool,
    pub fail_get: bool,
    pub list_failures_left: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_upserts(inner: Arc<DuckDbStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_upsert: true,
            fail_get: false,
            list_failures_left: AtomicUsize::new(0),
        })
    }

    pub fn failing_gets(inner: Arc<DuckDbStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_upsert: false,
            fail_get: true,
            list_failures_left: AtomicUsize::new(0),
        })
    }

    pub fn failing_lists(inner: Arc<DuckDbStore>, times: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_upsert: false,
            fail_get: false,
            list_failures_left: AtomicUsize::new(times),
        })
    }
}

#[async_trait]
impl ProfileStore for FlakyStore {
    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        description: &str,
        website: &str,
    ) -> Result<Profile, StoreError> {
        if self.fail_upsert {
            return Err(StoreError::Poisoned);
        }
        self.inner.upsert(user_id, category, description, website).await
    }

    async fn get(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Poisoned);
        }
        self.inner.get(user_id).await
    }

    async fn list_all(&self) -> Result<Vec<Profile>, StoreError> {
        let left = self.list_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.list_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(StoreError::Poisoned);
        }
        self.inner.list_all().await
    }

    async fn reports_by_category(&self, category: Category) -> Result<Vec<Report>, StoreError> {
        self.inner.reports_by_category(category).await
    }
}

pub struct Harness {
    pub bot: BotContext,
    pub transport: Arc<RecordingTransport>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub fn harness(
    store: Arc<dyn ProfileStore>,
    summarizer: Option<Arc<dyn SummaryGenerator>>,
) -> Harness {
    harness_with_delay(store, summarizer, Duration::ZERO)
}

pub fn harness_with_delay(
    store: Arc<dyn ProfileStore>,
    summarizer: Option<Arc<dyn SummaryGenerator>>,
    profile_offer_delay: Duration,
) -> Harness {
    let transport = RecordingTransport::new();
    let sessions = Arc::new(InMemorySessionStore::new());
    let dispatcher = Arc::new(ReportDispatcher::new(
        transport.clone(),
        summarizer,
        default_links(),
    ));

    let bot = BotContext::new(
        store,
        transport.clone(),
        dispatcher,
        sessions.clone(),
        ConversationSettings { profile_offer_delay },
    );

    Harness {
        bot,
        transport,
        sessions,
    }
}
