//! Recipe persistence. Handlers reach storage only through [`RecipeStore`].

mod memory;
mod postgres;

pub use memory::MemoryRecipeStore;
pub use postgres::{ensure_database_exists, ensure_recipe_table, PgRecipeStore};

use crate::error::AppError;
use crate::model::{NewRecipe, Page, PageRequest, Recipe, RecipeChanges};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Newest first, plus the total count of records.
    async fn list(&self, page: PageRequest) -> Result<Page, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, AppError>;

    /// Assigns the id and both timestamps.
    async fn insert(&self, recipe: NewRecipe, image: Option<String>) -> Result<Recipe, AppError>;

    /// Overwrites the mutable fields and bumps `updated_at`. `None` when the id no longer exists.
    async fn update(&self, id: Uuid, changes: RecipeChanges) -> Result<Option<Recipe>, AppError>;

    /// Returns the removed record, or `None` when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<Option<Recipe>, AppError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
