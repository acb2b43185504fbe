//! Request extractors.

pub mod recipe_form;

pub use recipe_form::{RecipeForm, IMAGE_FIELD};
