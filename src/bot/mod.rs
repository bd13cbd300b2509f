pub mod handlers;
pub mod messages;
pub mod router;
pub mod state;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::db::{ProfileStore, StoreError};
use crate::dispatch::ReportDispatcher;
use crate::transport::telegram::InboundHandler;
use crate::transport::{InboundMessage, OutboundMessage, Transport, TransportError};
use state::SessionStore;

pub const MAX_DESCRIPTION_CHARS: usize = 140;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description exceeds 140 characters")]
    DescriptionTooLong,
    #[error("website must start with http:// or https://")]
    InvalidWebsite,
}

impl ValidationError {
    pub fn reprompt(&self) -> &'static str {
        match self {
            ValidationError::DescriptionTooLong => messages::DESCRIPTION_TOO_LONG,
            ValidationError::InvalidWebsite => messages::WEBSITE_INVALID,
        }
    }
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Profile not saved: {0}")]
    ProfileNotSaved(StoreError),
    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

pub fn validate_description(text: &str) -> Result<&str, ValidationError> {
    if text.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(text)
}

pub fn validate_website(text: &str) -> Result<&str, ValidationError> {
    let text = text.trim();
    if text.starts_with("http://") || text.starts_with("https://") {
        Ok(text)
    } else {
        Err(ValidationError::InvalidWebsite)
    }
}

#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub profile_offer_delay: Duration,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            profile_offer_delay: Duration::from_secs(3),
        }
    }
}

/// Everything a handler needs, passed explicitly instead of living in globals.
pub struct BotContext {
    store: Arc<dyn ProfileStore>,
    transport: Arc<dyn Transport>,
    dispatcher: Arc<ReportDispatcher>,
    sessions: Arc<dyn SessionStore>,
    settings: ConversationSettings,
    user_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl BotContext {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<ReportDispatcher>,
        sessions: Arc<dyn SessionStore>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            store,
            transport,
            dispatcher,
            sessions,
            settings,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn user_lock(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(user_id).or_default().clone()
    }

    // Drops the entry once no other task holds or waits on it.
    fn release_user_lock(&self, user_id: i64) {
        let mut locks = self.user_locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(&user_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&user_id);
        }
    }

    /// Number of users with a message currently in flight.
    pub fn active_users(&self) -> usize {
        self.user_locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Routes one inbound message and maps any failure to a reply.
    /// Messages from the same user are handled one at a time.
    pub async fn handle(&self, message: InboundMessage) {
        let user_id = message.user_id;
        let lock = self.user_lock(user_id);
        {
            let _guard = lock.lock().await;
            self.handle_serialized(message).await;
        }
        drop(lock);
        self.release_user_lock(user_id);
    }

    async fn handle_serialized(&self, message: InboundMessage) {
        let state = self.sessions.get(message.user_id).await;
        let Some(route) = router::resolve(&message.text, &state) else {
            debug!("Ignoring unmatched input from {}", message.user_id);
            return;
        };

        if let Err(err) = self.run_route(route, &message, state).await {
            self.recover(message.user_id, err).await;
        }
    }

    async fn recover(&self, user_id: i64, err: BotError) {
        let (reply, clear_session) = match err {
            BotError::Validation(v) => {
                debug!("Validation failed for {}: {}", user_id, v);
                (Some(v.reprompt()), false)
            }
            BotError::ProfileNotSaved(e) => {
                error!("Error saving profile for {}: {}", user_id, e);
                (Some(messages::PROFILE_SAVE_FAILED), true)
            }
            BotError::Store(e) => {
                error!("Store error while handling {}: {}", user_id, e);
                (Some(messages::GENERIC_ERROR), true)
            }
            BotError::Transport(e) => {
                error!("Error replying to {}: {}", user_id, e);
                (None, false)
            }
        };

        if clear_session {
            self.sessions.clear(user_id).await;
        }
        if let Some(text) = reply {
            if let Err(e) = self.transport.send(OutboundMessage::text(user_id, text)).await {
                error!("Error sending error reply to {}: {}", user_id, e);
            }
        }
    }

    async fn reply(&self, message: OutboundMessage) -> Result<(), BotError> {
        self.transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl InboundHandler for BotContext {
    async fn handle(&self, message: InboundMessage) {
        BotContext::handle(self, message).await
    }
}
