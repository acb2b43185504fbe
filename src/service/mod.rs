//! Recipe operations and request validation.

mod recipes;
mod validation;
pub use recipes::RecipeService;
pub use validation::{FieldError, FieldRule, FieldValue, Location, RequestValidator, ValidationErrors, RECIPE_RULES};
