//! Read a recipe body (multipart with optional `image` file, urlencoded, or JSON) into a raw form.
//! Nothing is validated here beyond the body being readable.

use crate::error::AppError;
use crate::media::ImageUpload;
use crate::service::FieldValue;
use async_trait::async_trait;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::{Map, Value};

/// Multipart file field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Raw request fields. `None` means the field was not sent at all.
#[derive(Clone, Debug, Default)]
pub struct RecipeForm {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub image: Option<ImageUpload>,
}

impl RecipeForm {
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => self.title.as_deref().map(FieldValue::Text),
            "ingredients" => self.ingredients.as_deref().map(FieldValue::List),
            "instructions" => self.instructions.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }

    /// Apply one text field. Repeated `ingredients` values accumulate; a value holding a
    /// JSON array of strings is expanded.
    fn apply_text(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "instructions" => self.instructions = Some(value),
            "ingredients" | "ingredients[]" => {
                let items = self.ingredients.get_or_insert_with(Vec::new);
                match parse_json_list(&value) {
                    Some(list) => items.extend(list),
                    None => items.push(value),
                }
            }
            _ => {}
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = RecipeForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name == IMAGE_FIELD && (field.file_name().is_some() || field.content_type().is_some()) {
                let file_name = field.file_name().map(String::from);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_ascii_lowercase();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }
            let value = field.text().await.map_err(multipart_error)?;
            form.apply_text(&name, value);
        }
        Ok(form)
    }
}

fn parse_json_list(value: &str) -> Option<Vec<String>> {
    let trimmed = value.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn multipart_error(e: MultipartError) -> AppError {
    body_error(e.status(), e.body_text())
}

/// Unreadable body: 413 when the body limit tripped, else 400 with the extractor's text.
fn body_error(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(text)
    }
}

/// Scalars are taken as their text, like form fields. `null`, arrays and objects count as absent.
fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<Map<String, Value>> for RecipeForm {
    fn from(body: Map<String, Value>) -> Self {
        let ingredients = body.get("ingredients").and_then(|value| match value {
            Value::Array(items) => Some(items.iter().filter_map(json_text).collect()),
            other => json_text(other).map(|one| vec![one]),
        });
        RecipeForm {
            title: body.get("title").and_then(json_text),
            ingredients,
            instructions: body.get("instructions").and_then(json_text),
            image: None,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for RecipeForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());
        match content_type.as_deref() {
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;
                Self::from_multipart(multipart).await
            }
            Some(ct) if ct.starts_with("application/json") => {
                let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;
                Ok(body.into())
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;
                let mut form = RecipeForm::default();
                for (name, value) in pairs {
                    form.apply_text(&name, value);
                }
                Ok(form)
            }
            // No body: every field is absent and validation reports it.
            None => Ok(RecipeForm::default()),
            Some(other) => Err(AppError::BadRequest(format!("unsupported content type: {}", other))),
        }
    }
}
