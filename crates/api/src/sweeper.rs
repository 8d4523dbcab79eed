use std::time::Duration;

use gtm_site_core::ContentService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically drop drafts idle past the draft TTL.
pub fn spawn_draft_sweeper(content: ContentService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = content.sweep_expired_drafts(chrono::Utc::now()).await {
                tracing::warn!(error = %err, "draft sweep failed");
            }
        }
    })
}
