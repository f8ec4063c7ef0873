//! Postgres-backed implementations of the `nexa_contracts::catalog` ports.
//!
//! Each repository owns a `PgPool` and performs every write inside a
//! transaction, per spec.md §4.A ("all writes are in transactions").
//! Soft delete is implemented as an update of `deleted_at`, mirroring the
//! teacher's repository-layer interceptor pattern rather than a database
//! trigger, so the rewrite is visible at the call site.

mod items;
mod library;
mod media_parts;
mod relations;
mod settings;

pub use items::PgMetadataItemRepository;
pub use library::PgLibrarySectionRepository;
pub use media_parts::PgMediaPartRepository;
pub use relations::PgRelationRepository;
pub use settings::PgSettingsRepository;

use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::error::ErrorKind;

fn map_sqlx(e: sqlx::Error) -> CoreError {
    e.into()
}

/// A uniqueness violation maps to `ErrorKind::Conflict`; everything else a
/// transaction surfaces is `ErrorKind::Internal`, per spec.md §4.A.
pub(crate) fn map_tx_error(e: sqlx::Error) -> CoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CoreError::with_source(ErrorKind::Conflict, "duplicate value", e)
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            CoreError::with_source(ErrorKind::Internal, "referential integrity violation", e)
        }
        _ => map_sqlx(e),
    }
}

pub(crate) fn not_found(what: &str) -> CoreError {
    CoreError::not_found(what)
}

pub type PgResult<T> = CoreResult<T>;
