//! Shared application state for all routes: the store and media host handles.

use crate::media::MediaHost;
use crate::store::RecipeStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    /// `None` when no media credentials are configured; requests carrying an image then fail.
    pub media: Option<Arc<dyn MediaHost>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecipeStore>, media: Option<Arc<dyn MediaHost>>) -> Self {
        Self { store, media }
    }
}
