//! Liveness endpoint mounted on both services.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::identity::{ProcessIdentity, Service};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: Service,
    pub pid: u32,
}

/// `GET /healthz` for `service`, mergeable into any service router.
///
/// Answers from the captured identity alone; the consumer's copy never calls
/// the producer, so a down producer does not fail the liveness check.
pub fn routes<S>(service: Service, identity: ProcessIdentity) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/healthz",
        get(move || async move {
            Json(Health {
                status: "ok",
                service,
                pid: identity.pid,
            })
        }),
    )
}
