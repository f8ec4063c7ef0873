use crate::error::CoreResult;
use async_trait::async_trait;
use nexa_model::prelude::*;

/// Callback surface a worker uses to report progress. Implementations
/// accumulate progress in memory and flush to persistence/subscribers at
/// a configured interval; `report` itself never blocks on I/O.
pub trait ProgressSink: Send + Sync {
    fn report(&self, completed: i64, total: Option<i64>);
    fn fail(&self, message: String);
    fn cancel(&self);
}

#[async_trait]
pub trait JobWorker: Send + Sync {
    fn job_type(&self) -> JobType;
    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()>;
}

/// Narrow surface a worker uses to enqueue a downstream job without
/// depending on the scheduler that dispatches it — the scan pipeline's
/// Persist stage uses this to queue image generation and trickplay jobs
/// for affected items, per spec.md §4.B step 7.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_active(&self, scope: JobScope, job_type: JobType) -> CoreResult<Option<JobNotificationEntry>>;
    async fn create(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry>;
    async fn update_progress(
        &self,
        id: JobId,
        status: JobStatus,
        completed: i64,
        total: Option<i64>,
        error_message: Option<String>,
    ) -> CoreResult<JobNotificationEntry>;
    async fn active_for_user(&self, user_id: UserId) -> CoreResult<Vec<JobNotificationEntry>>;
    async fn purge_terminal_older_than(&self, days: i64) -> CoreResult<u64>;
}
