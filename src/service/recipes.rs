//! Recipe operations over the injected store and media host.

use crate::error::AppError;
use crate::media::{ImageUpload, MediaError, MediaRef};
use crate::model::{NewRecipe, Page, PageRequest, Recipe, RecipeChanges, RecipePatch};
use crate::state::AppState;
use uuid::Uuid;

pub struct RecipeService;

impl RecipeService {
    pub async fn list(state: &AppState, page: PageRequest) -> Result<Page, AppError> {
        state.store.list(page).await
    }

    pub async fn read(state: &AppState, id: &str) -> Result<Recipe, AppError> {
        let id = parse_id(id)?;
        state.store.find(id).await?.ok_or(AppError::NotFound)
    }

    /// Upload the image (if any) first; a failed upload means nothing is written.
    pub async fn create(state: &AppState, recipe: NewRecipe, image: Option<ImageUpload>) -> Result<Recipe, AppError> {
        let image_url = match image {
            Some(image) => Some(upload(state, image).await?),
            None => None,
        };
        match state.store.insert(recipe, image_url.clone()).await {
            Ok(row) => {
                tracing::info!(id = %row.id, "recipe created");
                Ok(row)
            }
            Err(e) => {
                if let Some(url) = image_url {
                    discard_media(state, &url).await;
                }
                Err(e)
            }
        }
    }

    /// Look up, then upload a replacement image (if any), then write the merged fields.
    pub async fn update(
        state: &AppState,
        id: &str,
        patch: RecipePatch,
        image: Option<ImageUpload>,
    ) -> Result<Recipe, AppError> {
        let id = parse_id(id)?;
        let existing = state.store.find(id).await?.ok_or(AppError::NotFound)?;
        let new_url = match image {
            Some(image) => Some(upload(state, image).await?),
            None => None,
        };
        let changes = RecipeChanges::merge(&existing, patch, new_url.clone());
        let updated = match state.store.update(id, changes).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                if let Some(url) = &new_url {
                    discard_media(state, url).await;
                }
                return Err(AppError::NotFound);
            }
            Err(e) => {
                if let Some(url) = &new_url {
                    discard_media(state, url).await;
                }
                return Err(e);
            }
        };
        if let (Some(_), Some(old)) = (&new_url, &existing.image) {
            if updated.image.as_ref() != Some(old) {
                discard_media(state, old).await;
            }
        }
        tracing::info!(%id, "recipe updated");
        Ok(updated)
    }

    /// Media cleanup is best-effort and runs before the record is removed.
    pub async fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
        let id = parse_id(id)?;
        let existing = state.store.find(id).await?.ok_or(AppError::NotFound)?;
        if let Some(url) = &existing.image {
            discard_media(state, url).await;
        }
        state.store.delete(id).await?.ok_or(AppError::NotFound)?;
        tracing::info!(%id, "recipe deleted");
        Ok(())
    }
}

/// A malformed id cannot match any record.
fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound)
}

async fn upload(state: &AppState, image: ImageUpload) -> Result<String, AppError> {
    let media = state.media.as_ref().ok_or(MediaError::Disabled)?;
    let url = media.upload(image).await?;
    tracing::debug!(url = %url, "image uploaded");
    Ok(url)
}

/// Failures are logged and swallowed.
async fn discard_media(state: &AppState, url: &str) {
    let Some(media_ref) = MediaRef::from_url(url) else {
        tracing::warn!(url = %url, "image url has no file name; skipping media delete");
        return;
    };
    let Some(media) = state.media.as_ref() else {
        tracing::warn!(url = %url, "media host not configured; skipping media delete");
        return;
    };
    if let Err(e) = media.delete(&media_ref).await {
        tracing::warn!(public_id = %media_ref.public_id, error = %e, "media delete failed");
    }
}
