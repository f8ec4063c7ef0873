use nexa_contracts::error::CoreResult;
use nexa_contracts::jobs::{JobRepository, ProgressSink};
use nexa_model::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

struct ProgressState {
    completed: i64,
    total: Option<i64>,
    status: JobStatus,
    error_message: Option<String>,
    dirty: bool,
}

/// In-memory accumulator behind every running job. `report`/`fail`/`cancel`
/// never touch the database directly — a background loop (`run_flush_loop`)
/// drains the accumulated state to `JobRepository` at `FlushIntervalMs`,
/// per spec.md §4.E.
pub struct JobProgressReporter {
    job_id: JobId,
    state: Mutex<ProgressState>,
    flush_now: Notify,
}

impl JobProgressReporter {
    pub fn new(job_id: JobId) -> Arc<Self> {
        Arc::new(Self {
            job_id,
            state: Mutex::new(ProgressState {
                completed: 0,
                total: None,
                status: JobStatus::Pending,
                error_message: None,
                dirty: true,
            }),
            flush_now: Notify::new(),
        })
    }

    pub fn mark_running(&self) {
        let mut s = self.state.lock().unwrap();
        if s.status == JobStatus::Pending {
            s.status = JobStatus::Running;
            s.dirty = true;
        }
    }

    pub fn mark_succeeded(&self) {
        let mut s = self.state.lock().unwrap();
        s.status = JobStatus::Succeeded;
        if let Some(total) = s.total {
            s.completed = total;
        }
        s.dirty = true;
        drop(s);
        self.flush_now.notify_one();
    }

    async fn flush_once(
        &self,
        repo: &dyn JobRepository,
        notifier: &broadcast::Sender<JobNotificationEntry>,
    ) -> CoreResult<bool> {
        let (completed, total, status, error_message) = {
            let mut s = self.state.lock().unwrap();
            if !s.dirty {
                return Ok(s.status.is_terminal());
            }
            s.dirty = false;
            (s.completed, s.total, s.status, s.error_message.clone())
        };
        let entry = repo.update_progress(self.job_id, status, completed, total, error_message).await?;
        let terminal = entry.status.is_terminal();
        let _ = notifier.send(entry);
        Ok(terminal)
    }

    /// Runs until the job reaches a terminal status, flushing at `interval`
    /// or immediately when `fail`/`cancel`/`mark_succeeded` fires.
    pub async fn run_flush_loop(
        self: Arc<Self>,
        repo: Arc<dyn JobRepository>,
        notifier: broadcast::Sender<JobNotificationEntry>,
        interval: Duration,
    ) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.flush_now.notified() => {}
            }
            match self.flush_once(&*repo, &notifier).await {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::warn!(job_id = %self.job_id, error = %e, "job progress flush failed"),
            }
        }
    }
}

impl ProgressSink for JobProgressReporter {
    fn report(&self, completed: i64, total: Option<i64>) {
        let mut s = self.state.lock().unwrap();
        s.completed = completed;
        s.total = total;
        if s.status == JobStatus::Pending {
            s.status = JobStatus::Running;
        }
        s.dirty = true;
    }

    fn fail(&self, message: String) {
        let mut s = self.state.lock().unwrap();
        s.status = JobStatus::Failed;
        s.error_message = Some(message);
        s.dirty = true;
        drop(s);
        self.flush_now.notify_one();
    }

    fn cancel(&self) {
        let mut s = self.state.lock().unwrap();
        s.status = JobStatus::Cancelled;
        s.dirty = true;
        drop(s);
        self.flush_now.notify_one();
    }
}
