use nexa_model::error::ErrorKind;
use thiserror::Error;

/// The single error type every repository, agent, and service method in
/// this workspace returns. Request handlers map `kind()` onto GraphQL
/// error extension codes and HTTP status, per spec.md §7.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, what)
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, what)
    }

    pub fn invalid_argument(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, what)
    }

    pub fn failed_precondition(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, what)
    }

    pub fn unauthenticated(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, what)
    }

    pub fn forbidden(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, what)
    }

    pub fn internal(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, what)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => CoreError::new(ErrorKind::NotFound, "row not found"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::with_source(ErrorKind::Conflict, "unique constraint violated", e)
            }
            _ => CoreError::with_source(ErrorKind::Internal, "database error", e),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// GraphQL resolvers surface `kind()` as `extensions.code`, the same name
/// used on the HTTP side's status mapping, so a client sees one error
/// vocabulary regardless of which transport it called through.
impl async_graphql::ErrorExtensions for CoreError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.message.clone()).extend_with(|_, e| {
            e.set("code", self.kind.to_string());
        })
    }
}
