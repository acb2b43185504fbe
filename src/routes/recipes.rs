//! Recipe CRUD routes. Mounted under [`RECIPES_PREFIX`].

use crate::handlers::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::CorsLayer;

pub const RECIPES_PREFIX: &str = "/api/v1/recipes";

/// `body_limit` caps request bodies (multipart uploads included) in bytes. Bodies over
/// the limit surface from the extractors as `AppError::PayloadTooLarge`.
pub fn recipe_routes(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(read).put(update).delete(delete_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
