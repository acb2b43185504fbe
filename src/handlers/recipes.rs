//! Recipe handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::extractors::RecipeForm;
use crate::response::{success_empty, success_one, success_page};
use crate::service::{RecipeService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = RequestValidator::validate_page(&params)?;
    let result = RecipeService::list(&state, page).await?;
    Ok(success_page(
        "Recipes retrieved successfully",
        result.items,
        page.total_pages(result.total),
        u64::from(page.page),
    ))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = RecipeService::read(&state, &id).await?;
    Ok(success_one(StatusCode::OK, "Recipe retrieved successfully", recipe))
}

pub async fn create(
    State(state): State<AppState>,
    form: RecipeForm,
) -> Result<impl IntoResponse, AppError> {
    let (recipe, image) = RequestValidator::validate_create(form)?;
    let row = RecipeService::create(&state, recipe, image).await?;
    Ok(success_one(StatusCode::CREATED, "Recipe created successfully", row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: RecipeForm,
) -> Result<impl IntoResponse, AppError> {
    let (patch, image) = RequestValidator::validate_update(form)?;
    let row = RecipeService::update(&state, &id, patch, image).await?;
    Ok(success_one(StatusCode::OK, "Recipe updated successfully", row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    RecipeService::delete(&state, &id).await?;
    Ok(success_empty("Recipe deleted successfully"))
}
