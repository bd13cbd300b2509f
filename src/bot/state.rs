use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::models::Category;

/// Where a user is in the conversation. A missing entry means `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingCategory,
    AwaitingProfileDecision {
        category: Category,
    },
    AwaitingDescription {
        category: Category,
    },
    AwaitingWebsite {
        category: Category,
        description: String,
    },
}

impl SessionState {
    pub fn pending_category(&self) -> Option<Category> {
        match self {
            SessionState::Idle | SessionState::AwaitingCategory => None,
            SessionState::AwaitingProfileDecision { category }
            | SessionState::AwaitingDescription { category }
            | SessionState::AwaitingWebsite { category, .. } => Some(*category),
        }
    }

    /// States in which a category button press is accepted.
    pub fn accepts_category(&self) -> bool {
        matches!(
            self,
            SessionState::Idle
                | SessionState::AwaitingCategory
                | SessionState::AwaitingProfileDecision { .. }
        )
    }
}

/// Per-user conversation progress. Never persisted by the default store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: i64) -> SessionState;

    async fn set(&self, user_id: i64, state: SessionState);

    async fn clear(&self, user_id: i64);
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: i64) -> SessionState {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn set(&self, user_id: i64, state: SessionState) {
        let mut sessions = self.sessions.write().await;
        if state == SessionState::Idle {
            sessions.remove(&user_id);
        } else {
            sessions.insert(user_id, state);
        }
    }

    async fn clear(&self, user_id: i64) {
        self.sessions.write().await.remove(&user_id);
    }
}
