//! HTTP-facing error mapping. `GraphQL` resolvers surface `CoreError`
//! through `async_graphql::ErrorExtensions` (see `nexa-contracts::error`);
//! this module is the equivalent mapping for the plain HTTP routes.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use nexa_contracts::error::CoreError;
use nexa_model::error::ErrorKind;
use serde::Serialize;

/// Wraps a `CoreError` so it can be returned directly from an axum
/// handler, following the teacher's `AppError` pattern: one type, a
/// `StatusCode`, and a JSON body shaped `{"error": {...}}`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

fn status_for(kind: &ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidArgument | ErrorKind::FileSystemBrowse => StatusCode::BAD_REQUEST,
        ErrorKind::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Cancelled => StatusCode::from_u16(499).unwrap(),
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind().clone();
        let status = status_for(&kind);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }

        let body = ErrorBody {
            error: ErrorDetail { code: kind.to_string(), message: self.0.message.clone() },
        };
        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            let value = format!(r#"Bearer error="{}", error_description="{}""#, kind, self.0.message);
            if let Ok(header) = HeaderValue::from_str(&value) {
                response.headers_mut().insert(axum::http::header::WWW_AUTHENTICATE, header);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
