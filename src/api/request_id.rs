//! Request ID middleware.
//!
//! Every inbound request is assigned an `X-Request-ID`:
//!
//! - accepted from the caller if they already provide one,
//! - freshly generated (UUID v4) otherwise.
//!
//! The ID is stored as an axum [`Extension`](axum::Extension), echoed back in
//! the response header, and opens a `request` span tagged with the service
//! name. `RecipeClient` forwards the consumer's ID to the producer, so one ID
//! ties the `web-api` span to the `recipe-api` pid log line it caused.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument as _;
use uuid::Uuid;

use crate::identity::Service;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapper carrying the assigned request ID.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Axum middleware that assigns a [`RequestId`] to every request.
///
/// Install with `from_fn_with_state(service, request_id_middleware)`, inside
/// the `tower_http::TraceLayer`.
pub async fn request_id_middleware(
    State(service): State<Service>,
    mut req: Request,
    next: Next,
) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!("request", %service, request_id = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
