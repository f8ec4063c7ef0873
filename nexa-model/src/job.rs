use crate::ids::{JobId, LibrarySectionId, MetadataItemId};
use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A background work type orchestrated by the job scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    LibraryScan,
    MetadataRefresh,
    FileAnalysis,
    ImageGeneration,
    TrickplayGeneration,
}

/// Lifecycle status of a `JobNotificationEntry`. Transitions are monotonic:
/// Pending → Running → {Succeeded, Failed, Cancelled}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Valid forward transitions; used to assert the scheduler never
    /// regresses a job's status.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Cancelled)
                | (Pending, Failed)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

/// The scope a job notification is tracked against: a library section scan,
/// or a single item's metadata refresh/analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobScope {
    LibrarySection(LibrarySectionId),
    Item(MetadataItemId),
}

/// Progress/status record for one `(scope, job_type)`. At most one active
/// entry exists per `(library_section, job_type)`; history rows accumulate.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct JobNotificationEntry {
    pub id: JobId,
    #[graphql(skip)]
    pub scope: JobScope,
    pub job_type: JobType,
    pub status: JobStatus,
    pub progress_percent: f64,
    pub completed_items: i64,
    pub total_items: Option<i64>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl JobNotificationEntry {
    pub fn library_section_id(&self) -> Option<LibrarySectionId> {
        match self.scope {
            JobScope::LibrarySection(id) => Some(id),
            JobScope::Item(_) => None,
        }
    }
}
