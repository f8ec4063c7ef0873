use crate::jobs::progress::JobProgressReporter;
use async_trait::async_trait;
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::jobs::{JobRepository, JobSubmitter, JobWorker, ProgressSink};
use nexa_model::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::broadcast;

/// Owns the worker registry and dispatches submitted jobs onto background
/// tasks. Per spec.md §4.E, at most one active entry exists per
/// `(library_section, job_type)`; `submit` relies on `JobRepository::create`
/// returning the existing active entry on a duplicate rather than racing a
/// separate existence check against the database.
pub struct JobScheduler {
    repo: Arc<dyn JobRepository>,
    workers: HashMap<JobType, Arc<dyn JobWorker>>,
    notifier: broadcast::Sender<JobNotificationEntry>,
    flush_interval: Duration,
}

impl JobScheduler {
    pub fn new(repo: Arc<dyn JobRepository>, flush_interval: Duration) -> Self {
        let (notifier, _) = broadcast::channel(256);
        Self { repo, workers: HashMap::new(), notifier, flush_interval }
    }

    pub fn register_worker(&mut self, worker: Arc<dyn JobWorker>) {
        self.workers.insert(worker.job_type(), worker);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobNotificationEntry> {
        self.notifier.subscribe()
    }

    pub fn repository(&self) -> Arc<dyn JobRepository> {
        self.repo.clone()
    }

    pub async fn submit(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry> {
        let entry = self.repo.create(scope, job_type).await?;
        if entry.status != JobStatus::Pending {
            // `create` handed back an already-active entry for this scope;
            // nothing new to spawn.
            return Ok(entry);
        }

        let worker = self
            .workers
            .get(&job_type)
            .cloned()
            .ok_or_else(|| CoreError::internal(format!("no worker registered for {job_type:?}")))?;

        let reporter = JobProgressReporter::new(entry.id);
        let repo = self.repo.clone();
        let notifier = self.notifier.clone();
        let flush_interval = self.flush_interval;
        let flush_reporter = reporter.clone();
        tokio::spawn(async move {
            flush_reporter.run_flush_loop(repo, notifier, flush_interval).await;
        });

        let run_reporter = reporter.clone();
        tokio::spawn(async move {
            run_reporter.mark_running();
            match worker.run(scope, run_reporter.as_ref()).await {
                Ok(()) => run_reporter.mark_succeeded(),
                Err(e) => run_reporter.fail(e.message),
            }
        });

        Ok(entry)
    }
}

#[async_trait]
impl JobSubmitter for JobScheduler {
    async fn submit(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry> {
        self.submit(scope, job_type).await
    }
}

/// A `JobSubmitter` handle that can be handed to a worker before the
/// scheduler that owns it exists. Workers are registered on the scheduler
/// during construction, but the scheduler itself is only `Arc`-wrapped
/// afterward, so this cell is filled in right after that wrap — see
/// `JobScheduler::new` callers in server startup.
#[derive(Default)]
pub struct DeferredSubmitter {
    inner: OnceLock<Weak<dyn JobSubmitter>>,
}

impl DeferredSubmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Panics if called twice; startup code should call this exactly once,
    /// immediately after `Arc::new`-wrapping the scheduler.
    pub fn bind(&self, scheduler: Weak<dyn JobSubmitter>) {
        self.inner
            .set(scheduler)
            .unwrap_or_else(|_| panic!("DeferredSubmitter bound twice"));
    }
}

#[async_trait]
impl JobSubmitter for DeferredSubmitter {
    async fn submit(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry> {
        let handle = self
            .inner
            .get()
            .ok_or_else(|| CoreError::internal("job submitter not yet bound"))?
            .upgrade()
            .ok_or_else(|| CoreError::internal("job scheduler has shut down"))?;
        handle.submit(scope, job_type).await
    }
}
