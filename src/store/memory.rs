//! In-process store. Used when no DATABASE_URL is configured and by tests.

use super::RecipeStore;
use crate::error::AppError;
use crate::model::{NewRecipe, Page, PageRequest, Recipe, RecipeChanges};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Records kept in insertion order.
#[derive(Default)]
pub struct MemoryRecipeStore {
    records: RwLock<Vec<Recipe>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn list(&self, page: PageRequest) -> Result<Page, AppError> {
        let records = self.records.read().await;
        let mut sorted: Vec<&Recipe> = records.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let items = sorted
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: records.len() as u64,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, recipe: NewRecipe, image: Option<String>) -> Result<Recipe, AppError> {
        let mut records = self.records.write().await;
        let mut id = Uuid::new_v4();
        while records.iter().any(|r| r.id == id) {
            id = Uuid::new_v4();
        }
        let now = Utc::now();
        let row = Recipe {
            id,
            title: recipe.title,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            image,
            created_at: now,
            updated_at: now,
        };
        records.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let mut records = self.records.write().await;
        let Some(row) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.title = changes.title;
        row.ingredients = changes.ingredients;
        row.instructions = changes.instructions;
        row.image = changes.image;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        let mut records = self.records.write().await;
        let pos = records.iter().position(|r| r.id == id);
        Ok(pos.map(|i| records.remove(i)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
