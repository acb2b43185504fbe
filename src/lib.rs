//! Recipe API: CRUD over recipe records with optional hosted images.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod media;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{AppConfig, DatabaseConfig, MediaConfig, ServerConfig};
pub use error::{AppError, ConfigError};
pub use media::{MediaHost, MemoryMediaHost, S3MediaHost};
pub use model::{NewRecipe, PageRequest, Recipe, RecipePatch};
pub use routes::{app, common_routes, recipe_routes, RECIPES_PREFIX};
pub use service::{RecipeService, RequestValidator};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_recipe_table, MemoryRecipeStore, PgRecipeStore, RecipeStore};
