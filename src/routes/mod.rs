//! Routers: common probes plus the versioned recipe resource.

mod common;
mod recipes;

pub use common::common_routes;
pub use recipes::{recipe_routes, RECIPES_PREFIX};

use crate::state::AppState;
use axum::Router;

/// Full application router.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(RECIPES_PREFIX, recipe_routes(state, body_limit))
}
