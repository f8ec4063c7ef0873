use nexa_contracts::jobs::JobRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Purges terminal job notifications older than `retention_days` on a fixed
/// tick, per spec.md §4.E. Runs for the lifetime of the server; cancelling
/// `token` stops it at the next tick boundary.
pub async fn run_retention_cleanup(
    repo: Arc<dyn JobRepository>,
    retention_days: i64,
    tick: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match repo.purge_terminal_older_than(retention_days).await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "purged terminal job notifications past retention window");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "job notification retention cleanup failed"),
                }
            }
            _ = token.cancelled() => break,
        }
    }
}
