//! Recipe record and the typed write shapes produced by validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for an insert. Only built by the validation stage.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

/// Partial update. `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
}

/// Values written back by an update, after merging the patch over the stored record.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeChanges {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub image: Option<String>,
}

impl RecipeChanges {
    /// Apply `patch` over `existing`; `image` replaces the stored URL only when `Some`.
    pub fn merge(existing: &Recipe, patch: RecipePatch, image: Option<String>) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| existing.title.clone()),
            ingredients: patch.ingredients.unwrap_or_else(|| existing.ingredients.clone()),
            instructions: patch.instructions.unwrap_or_else(|| existing.instructions.clone()),
            image: image.or_else(|| existing.image.clone()),
        }
    }
}

/// One page of a listing plus the total record count.
#[derive(Clone, Debug)]
pub struct Page {
    pub items: Vec<Recipe>,
    pub total: u64,
}

/// Validated pagination parameters; both are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
