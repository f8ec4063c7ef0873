use std::fmt;

/// Error kinds shared across the catalog, scan, hub, job, auth, and
/// streaming subsystems. Mirrors the `kind` taxonomy a GraphQL resolver
/// or HTTP handler maps onto a client-visible error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    InvalidArgument,
    FailedPrecondition,
    Unavailable,
    ResourceExhausted,
    FileSystemBrowse,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::FailedPrecondition => "FAILED_PRECONDITION",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::ResourceExhausted => "RESOURCE_EXHAUSTED",
            ErrorKind::FileSystemBrowse => "FILE_SYSTEM_BROWSE",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}
