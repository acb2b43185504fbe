//! Request validation from declarative field rules. Every violation is collected before failing.

use crate::extractors::RecipeForm;
use crate::media::ImageUpload;
use crate::model::{NewRecipe, PageRequest, RecipePatch};
use serde::Serialize;
use std::collections::HashMap;

/// Where the offending value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Query,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub msg: String,
    pub path: String,
    pub location: Location,
}

impl FieldError {
    pub fn new(path: impl Into<String>, msg: impl Into<String>, location: Location) -> Self {
        Self {
            kind: "field",
            msg: msg.into(),
            path: path.into(),
            location,
        }
    }
}

/// Serializes as `{ "errors": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Borrowed view of one form field.
#[derive(Clone, Copy, Debug)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }

    fn char_len(&self) -> usize {
        match self {
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::List(items) => items.len(),
        }
    }
}

pub struct FieldRule {
    pub field: &'static str,
    pub required: &'static str,
    pub max_length: Option<(usize, &'static str)>,
}

/// Rules for the recipe body, in reporting order.
pub const RECIPE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        required: "Title is required",
        max_length: Some((100, "Title should not exceed 100 characters")),
    },
    FieldRule {
        field: "ingredients",
        required: "Ingredients are required",
        max_length: None,
    },
    FieldRule {
        field: "instructions",
        required: "Instructions are required",
        max_length: None,
    },
];

pub const IMAGE_TYPE_MESSAGE: &str = "Image must be a JPEG, PNG, GIF or WebP file";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Every rule's field must be present.
    Create,
    /// Only present fields are checked.
    Update,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. All of title, ingredients and instructions are required.
    pub fn validate_create(form: RecipeForm) -> Result<(NewRecipe, Option<ImageUpload>), ValidationErrors> {
        let errors = check(&form, Mode::Create);
        let RecipeForm {
            title,
            ingredients,
            instructions,
            image,
        } = form;
        errors.into_result(()).map(|()| {
            (
                NewRecipe {
                    title: title.unwrap_or_default(),
                    ingredients: clean_ingredients(ingredients.unwrap_or_default()),
                    instructions: instructions.unwrap_or_default(),
                },
                image,
            )
        })
    }

    /// Validate an update body. Omitted fields are fine; present-but-empty fields are not.
    pub fn validate_update(form: RecipeForm) -> Result<(RecipePatch, Option<ImageUpload>), ValidationErrors> {
        let errors = check(&form, Mode::Update);
        let RecipeForm {
            title,
            ingredients,
            instructions,
            image,
        } = form;
        errors.into_result(()).map(|()| {
            (
                RecipePatch {
                    title,
                    ingredients: ingredients.map(clean_ingredients),
                    instructions,
                },
                image,
            )
        })
    }

    /// Parse `page` / `limit` query parameters. Limit is capped at [`PageRequest::MAX_LIMIT`].
    pub fn validate_page(params: &HashMap<String, String>) -> Result<PageRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut positive = |key: &str, msg: &str, default: u32| -> u32 {
            match params.get(key).map(|v| v.trim()) {
                None | Some("") => default,
                Some(v) => match v.parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        errors.push(FieldError::new(key, msg, Location::Query));
                        default
                    }
                },
            }
        };
        let page = positive("page", "Page must be a positive integer", PageRequest::DEFAULT_PAGE);
        let limit = positive("limit", "Limit must be a positive integer", PageRequest::DEFAULT_LIMIT);
        errors.into_result(PageRequest {
            page,
            limit: limit.min(PageRequest::MAX_LIMIT),
        })
    }
}

fn check(form: &RecipeForm, mode: Mode) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for rule in RECIPE_RULES {
        match form.field(rule.field) {
            None if mode == Mode::Update => {}
            None => errors.push(FieldError::new(rule.field, rule.required, Location::Body)),
            Some(v) if v.is_blank() => errors.push(FieldError::new(rule.field, rule.required, Location::Body)),
            Some(v) => {
                if let Some((max, msg)) = rule.max_length {
                    if v.char_len() > max {
                        errors.push(FieldError::new(rule.field, msg, Location::Body));
                    }
                }
            }
        }
    }
    if let Some(image) = &form.image {
        if !image.is_allowed_type() {
            errors.push(FieldError::new("image", IMAGE_TYPE_MESSAGE, Location::Body));
        }
    }
    errors
}

fn clean_ingredients(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|i| !i.trim().is_empty()).collect()
}
