use nexa_contracts::error::CoreResult;
use nexa_contracts::jobs::JobRepository;
use nexa_model::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::Stream;

/// A per-subscriber stream that first replays every currently active entry,
/// then forwards live updates, per spec.md §4.E ("bootstrapping a new
/// subscriber first delivers all currently active entries, then live
/// updates"). Closes when the broadcast sender is dropped or lags.
pub fn subscribe(
    repo: Arc<dyn JobRepository>,
    user_id: UserId,
    mut receiver: broadcast::Receiver<JobNotificationEntry>,
) -> impl Stream<Item = JobNotificationEntry> {
    async_stream::stream! {
        let bootstrap: CoreResult<Vec<JobNotificationEntry>> = repo.active_for_user(user_id).await;
        if let Ok(entries) = bootstrap {
            for entry in entries {
                yield entry;
            }
        }
        loop {
            match receiver.recv().await {
                Ok(entry) => yield entry,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
