use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{Category, Profile, Report};
use crate::db::service::DbService;
use crate::db::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database Error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// Persistence seam used by the conversation and the broadcast scheduler.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        description: &str,
        website: &str,
    ) -> Result<Profile, StoreError>;

    async fn get(&self, user_id: i64) -> Result<Option<Profile>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Profile>, StoreError>;

    async fn reports_by_category(&self, category: Category) -> Result<Vec<Report>, StoreError>;
}

#[derive(Clone)]
pub struct DuckDbStore {
    pool: DbPool,
}

impl DuckDbStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&duckdb::Connection) -> duckdb::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.pool.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&*conn)?)
    }

    pub fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.with_conn(DbService::list_reports)
    }
}

#[async_trait]
impl ProfileStore for DuckDbStore {
    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        description: &str,
        website: &str,
    ) -> Result<Profile, StoreError> {
        self.with_conn(|conn| {
            DbService::upsert_profile(conn, user_id, category, description, website)
        })
    }

    async fn get(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        self.with_conn(|conn| DbService::get_profile(conn, user_id))
    }

    async fn list_all(&self) -> Result<Vec<Profile>, StoreError> {
        self.with_conn(DbService::list_profiles)
    }

    async fn reports_by_category(&self, category: Category) -> Result<Vec<Report>, StoreError> {
        self.with_conn(|conn| DbService::reports_by_category(conn, category))
    }
}
