//! Recipe producer API (`recipe-api`, port 4000).
//!
//! A pure lookup over the read-only [`RecipeBook`]: no writes, no state
//! changes. The only side effect is a log line naming the serving pid.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::{
    api::health,
    error::AppError,
    identity::{ProcessIdentity, Service},
    recipe::{RecipeBook, RecipeEnvelope},
};

/// Shared, immutable state injected into every producer handler.
pub struct ProducerState {
    pub identity: ProcessIdentity,
    pub book: RecipeBook,
}

impl ProducerState {
    pub fn new(identity: ProcessIdentity, book: RecipeBook) -> Self {
        Self { identity, book }
    }
}

/// Build the producer's axum router.
pub fn router(state: Arc<ProducerState>) -> Router {
    let health = health::routes(Service::RecipeApi, state.identity);
    Router::new()
        .route("/recipes/{id}", get(get_recipe))
        .merge(health)
        .with_state(state)
}

/// `GET /recipes/{id}`: the recipe wrapped with the serving pid.
///
/// Unknown ids (anything but 42) answer 404 `{"detail": "not_found"}`.
pub async fn get_recipe(
    State(state): State<Arc<ProducerState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RecipeEnvelope>>, AppError> {
    info!(pid = state.identity.pid, recipe_id = id, "serving recipe lookup");

    let recipe = state.book.get(id).ok_or(AppError::NotFound)?;
    Ok(Json(vec![RecipeEnvelope {
        producer_pid: state.identity.pid,
        recipe: recipe.clone(),
    }]))
}
