//! HTTP handlers for the recipe resource.

pub mod recipes;
pub use recipes::*;
