use crate::catalog::postgres::{map_tx_error, not_found};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::jobs::JobRepository;
use nexa_model::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    public_id: Uuid,
    library_section_id: Option<Uuid>,
    item_id: Option<Uuid>,
    job_type: String,
    status: String,
    progress_percent: f64,
    completed_items: i64,
    total_items: Option<i64>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn job_type_key(t: JobType) -> &'static str {
    match t {
        JobType::LibraryScan => "LIBRARY_SCAN",
        JobType::MetadataRefresh => "METADATA_REFRESH",
        JobType::FileAnalysis => "FILE_ANALYSIS",
        JobType::ImageGeneration => "IMAGE_GENERATION",
        JobType::TrickplayGeneration => "TRICKPLAY_GENERATION",
    }
}

fn parse_job_type(s: &str) -> JobType {
    match s {
        "LIBRARY_SCAN" => JobType::LibraryScan,
        "METADATA_REFRESH" => JobType::MetadataRefresh,
        "FILE_ANALYSIS" => JobType::FileAnalysis,
        "IMAGE_GENERATION" => JobType::ImageGeneration,
        _ => JobType::TrickplayGeneration,
    }
}

fn status_key(s: JobStatus) -> &'static str {
    match s {
        JobStatus::Pending => "PENDING",
        JobStatus::Running => "RUNNING",
        JobStatus::Succeeded => "SUCCEEDED",
        JobStatus::Failed => "FAILED",
        JobStatus::Cancelled => "CANCELLED",
    }
}

fn parse_status(s: &str) -> JobStatus {
    match s {
        "PENDING" => JobStatus::Pending,
        "RUNNING" => JobStatus::Running,
        "SUCCEEDED" => JobStatus::Succeeded,
        "FAILED" => JobStatus::Failed,
        _ => JobStatus::Cancelled,
    }
}

impl TryFrom<JobRow> for JobNotificationEntry {
    type Error = CoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let scope = match (row.library_section_id, row.item_id) {
            (Some(lib), _) => JobScope::LibrarySection(lib.into()),
            (None, Some(item)) => JobScope::Item(item.into()),
            (None, None) => return Err(CoreError::internal("job notification row has no scope")),
        };
        Ok(JobNotificationEntry {
            id: row.public_id.into(),
            scope,
            job_type: parse_job_type(&row.job_type),
            status: parse_status(&row.status),
            progress_percent: row.progress_percent,
            completed_items: row.completed_items,
            total_items: row.total_items,
            error_message: row.error_message,
            updated_at: row.updated_at,
            created_at: row.created_at,
        })
    }
}

const SELECT: &str = "select public_id, library_section_id, item_id, job_type, status, \
    progress_percent, completed_items, total_items, error_message, created_at, updated_at \
    from job_notifications";

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_active(&self, scope: JobScope, job_type: JobType) -> CoreResult<Option<JobNotificationEntry>> {
        let row: Option<JobRow> = match scope {
            JobScope::LibrarySection(lib) => sqlx::query_as(&format!(
                "{SELECT} where library_section_id = $1 and job_type = $2 and status in ('PENDING','RUNNING')"
            ))
            .bind(lib.as_uuid())
            .bind(job_type_key(job_type))
            .fetch_optional(&self.pool)
            .await,
            JobScope::Item(item) => sqlx::query_as(&format!(
                "{SELECT} where item_id = $1 and job_type = $2 and status in ('PENDING','RUNNING')"
            ))
            .bind(item.as_uuid())
            .bind(job_type_key(job_type))
            .fetch_optional(&self.pool)
            .await,
        }
        .map_err(map_tx_error)?;
        row.map(TryFrom::try_from).transpose()
    }

    async fn create(&self, scope: JobScope, job_type: JobType) -> CoreResult<JobNotificationEntry> {
        // The partial unique index on (library_section_id, job_type) where
        // status is active rejects a concurrent duplicate; callers are
        // expected to call `find_active` first and return the existing id
        // on conflict, per spec.md §4.E.
        if let Some(existing) = self.find_active(scope, job_type).await? {
            return Ok(existing);
        }
        let public_id = Uuid::now_v7();
        let (lib, item) = match scope {
            JobScope::LibrarySection(lib) => (Some(lib.as_uuid()), None),
            JobScope::Item(item) => (None, Some(item.as_uuid())),
        };
        let row: JobRow = sqlx::query_as(&format!(
            "insert into job_notifications (public_id, library_section_id, item_id, job_type, status) \
             values ($1,$2,$3,$4,'PENDING') returning {}",
            columns()
        ))
        .bind(public_id)
        .bind(lib)
        .bind(item)
        .bind(job_type_key(job_type))
        .fetch_one(&self.pool)
        .await
        .map_err(map_tx_error)?;
        row.try_into()
    }

    async fn update_progress(
        &self,
        id: JobId,
        status: JobStatus,
        completed: i64,
        total: Option<i64>,
        error_message: Option<String>,
    ) -> CoreResult<JobNotificationEntry> {
        let percent = match total {
            Some(t) if t > 0 => (completed as f64 / t as f64 * 100.0).min(100.0),
            _ => 0.0,
        };
        let row: Option<JobRow> = sqlx::query_as(&format!(
            "update job_notifications set status = $2, progress_percent = $3, completed_items = $4, \
             total_items = $5, error_message = $6, updated_at = now() where public_id = $1 returning {}",
            columns()
        ))
        .bind(id.as_uuid())
        .bind(status_key(status))
        .bind(percent)
        .bind(completed)
        .bind(total)
        .bind(error_message)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tx_error)?;
        row.ok_or_else(|| not_found("job notification not found"))?.try_into()
    }

    async fn active_for_user(&self, _user_id: UserId) -> CoreResult<Vec<JobNotificationEntry>> {
        // Job ownership is not yet a first-class column (spec.md leaves
        // `owner_user_id` nullable); until per-user scoping lands, every
        // administrator sees every active job.
        let rows: Vec<JobRow> = sqlx::query_as(&format!("{SELECT} where status in ('PENDING','RUNNING')"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_tx_error)?;
        rows.into_iter().map(TryFrom::try_from).collect()
    }

    async fn purge_terminal_older_than(&self, days: i64) -> CoreResult<u64> {
        let result = sqlx::query(
            "delete from job_notifications where status in ('SUCCEEDED','FAILED','CANCELLED') \
             and updated_at < now() - make_interval(days => $1)",
        )
        .bind(days as i32)
        .execute(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(result.rows_affected())
    }
}

fn columns() -> &'static str {
    "public_id, library_section_id, item_id, job_type, status, progress_percent, \
     completed_items, total_items, error_message, created_at, updated_at"
}
