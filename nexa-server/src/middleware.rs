//! Request-scoped correlation id, threaded through tracing spans so a log
//! line for a failed request can be found by the id returned to the
//! client, following the teacher's `from_fn_with_state` middleware style
//! (see its HTTPS-enforcement layer).

use axum::body::Body;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

const HEADER_NAME: &str = "x-request-id";

pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    req.headers_mut()
        .insert(HEADER_NAME, HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("invalid")));

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(req).instrument(span).await;
    if let Ok(header) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HEADER_NAME, header);
    }
    response
}
