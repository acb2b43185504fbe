//! In-process media host that records calls. Can be switched to fail.

use super::{ImageUpload, MediaError, MediaHost, MediaRef};
use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub struct MemoryMediaHost {
    base_url: String,
    uploads: Mutex<Vec<(String, ImageUpload)>>,
    deletes: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryMediaHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// URLs handed out so far.
    pub fn uploaded_urls(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Public ids passed to `delete`, including failed attempts.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryMediaHost {
    fn default() -> Self {
        Self::new("https://media.local/recipes")
    }
}

#[async_trait]
impl MediaHost for MemoryMediaHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::upload("media host rejected the file").with_status(StatusCode::BAD_GATEWAY));
        }
        let url = format!("{}/{}.{}", self.base_url, Uuid::new_v4().simple(), image.extension());
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((url.clone(), image));
        Ok(url)
    }

    async fn delete(&self, media: &MediaRef) -> Result<(), MediaError> {
        self.deletes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(media.public_id.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MediaError::delete("media host unavailable").with_status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }
}
