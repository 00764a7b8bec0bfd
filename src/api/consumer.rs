//! Relaying web API (`web-api`, port 3000).
//!
//! A thin layer over [`RecipeClient`]: each `GET /` makes exactly one call to
//! the producer and wraps whatever it returned with this process's pid. There
//! is no fallback payload; a failed upstream call is a failed request.

use std::sync::Arc;

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::{
    api::{health, request_id::RequestId},
    error::AppError,
    identity::{ProcessIdentity, Service},
    recipe::TIKKA_MASALA_ID,
    upstream::RecipeClient,
};

/// Shared state injected into every consumer handler.
pub struct ConsumerState {
    pub identity: ProcessIdentity,
    pub client: RecipeClient,
}

impl ConsumerState {
    pub fn new(identity: ProcessIdentity, client: RecipeClient) -> Self {
        Self { identity, client }
    }
}

/// One element of the `GET /` response array.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResponse {
    pub consumer_process_id: u32,
    /// The producer's response body, key order included.
    pub producer_data: Value,
}

/// Build the consumer's axum router.
pub fn router(state: Arc<ConsumerState>) -> Router {
    let health = health::routes(Service::WebApi, state.identity);
    Router::new()
        .route("/", get(relay_recipe))
        .merge(health)
        .with_state(state)
}

/// `GET /`: fetch recipe 42 from the producer and relay it.
///
/// When the request-id middleware ran, its ID is forwarded to the producer.
pub async fn relay_recipe(
    State(state): State<Arc<ConsumerState>>,
    request_id: Option<Extension<RequestId>>,
) -> Result<Json<Vec<AggregatedResponse>>, AppError> {
    let fetched = match &request_id {
        Some(Extension(RequestId(id))) => {
            state.client.fetch_recipe_for(TIKKA_MASALA_ID, id).await
        }
        None => state.client.fetch_recipe(TIKKA_MASALA_ID).await,
    };
    let producer_data = fetched.map_err(AppError::Upstream)?;

    tracing::debug!(
        pid = state.identity.pid,
        target = state.client.base_url(),
        "relaying producer response"
    );
    Ok(Json(vec![AggregatedResponse {
        consumer_process_id: state.identity.pid,
        producer_data,
    }]))
}
