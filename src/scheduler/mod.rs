use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::db::{ProfileStore, StoreError};
use crate::dispatch::ReportDispatcher;

/// Re-sends category-matched reports to every stored profile on a fixed interval.
pub struct BroadcastScheduler {
    store: Arc<dyn ProfileStore>,
    dispatcher: Arc<ReportDispatcher>,
    interval: Duration,
    retry_delay: Duration,
}

impl BroadcastScheduler {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        dispatcher: Arc<ReportDispatcher>,
        interval: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            interval,
            retry_delay,
        }
    }

    /// One fan-out pass. Returns how many reports reached their recipient.
    pub async fn run_once(&self) -> Result<usize, StoreError> {
        let profiles = self.store.list_all().await?;
        let mut delivered = 0;

        for profile in &profiles {
            let reports = self.store.reports_by_category(profile.category).await?;
            for report in &reports {
                if self.dispatcher.deliver(profile.user_id, report, Some(profile)).await {
                    delivered += 1;
                }
            }
        }

        Ok(delivered)
    }

    /// Runs until the process exits. A failed pass backs off and resumes;
    /// passes missed while the process was down are not made up.
    pub async fn run(self) {
        info!(
            "Broadcast scheduler started (interval {:?}, retry {:?})",
            self.interval, self.retry_delay
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let failed = match self.run_once().await {
                Ok(delivered) => {
                    info!("Broadcast delivered {} reports", delivered);
                    false
                }
                Err(e) => {
                    error!("Error in regular reports: {}", e);
                    true
                }
            };

            if failed {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }
}
