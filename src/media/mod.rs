//! Image hosting. Uploaded files get a public URL; records only ever store that URL.

mod memory;
mod s3;

pub use memory::MemoryMediaHost;
pub use s3::S3MediaHost;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use thiserror::Error;

/// Content types accepted for recipe images.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("image upload failed: {message}")]
    Upload { message: String, status: Option<StatusCode> },
    #[error("image delete failed: {message}")]
    Delete { message: String, status: Option<StatusCode> },
    #[error("image uploads are not configured")]
    Disabled,
}

impl MediaError {
    pub fn upload(message: impl Into<String>) -> Self {
        MediaError::Upload {
            message: message.into(),
            status: None,
        }
    }

    pub fn delete(message: impl Into<String>) -> Self {
        MediaError::Delete {
            message: message.into(),
            status: None,
        }
    }

    /// Attach the upstream status. Ignored unless it is a 4xx or 5xx.
    pub fn with_status(mut self, code: StatusCode) -> Self {
        let code = (code.is_client_error() || code.is_server_error()).then_some(code);
        match &mut self {
            MediaError::Upload { status, .. } | MediaError::Delete { status, .. } => *status = code,
            MediaError::Disabled => {}
        }
        self
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            MediaError::Upload { status, .. } | MediaError::Delete { status, .. } => *status,
            MediaError::Disabled => Some(StatusCode::BAD_REQUEST),
        }
    }
}

/// An image file taken from the request body.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn is_allowed_type(&self) -> bool {
        ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str())
    }

    /// File extension for the stored object: from the content type, else the original file name.
    pub fn extension(&self) -> String {
        let by_type = match self.content_type.as_str() {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        };
        if let Some(ext) = by_type {
            return ext.to_string();
        }
        self.file_name
            .as_deref()
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Identifies a hosted object, derived from its public URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRef {
    /// Last path segment without its extension.
    pub public_id: String,
    pub extension: Option<String>,
}

impl MediaRef {
    /// `https://host/a/b/abc123.png?v=1` → `abc123` + `png`. `None` when the URL has no file name.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or("");
        let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
        let (_, segment) = path.rsplit_once('/')?;
        if segment.is_empty() {
            return None;
        }
        let (public_id, extension) = match segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_string())),
            _ => (segment, None),
        };
        Some(Self {
            public_id: public_id.to_string(),
            extension,
        })
    }

    pub fn file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.public_id, ext),
            None => self.public_id.clone(),
        }
    }
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store the image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError>;

    async fn delete(&self, media: &MediaRef) -> Result<(), MediaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example.com/recipes/abc123.png", "abc123", Some("png"))]
    #[case("https://res.host/image/upload/v1712/recipes/x9.jpeg?foo=1", "x9", Some("jpeg"))]
    #[case("https://cdn.example.com/noext", "noext", None)]
    #[case("https://cdn.example.com/a/archive.tar.gz", "archive.tar", Some("gz"))]
    fn public_id_is_file_name_without_extension(
        #[case] url: &str,
        #[case] id: &str,
        #[case] ext: Option<&str>,
    ) {
        let media = MediaRef::from_url(url).unwrap();
        assert_eq!(media.public_id, id);
        assert_eq!(media.extension.as_deref(), ext);
    }

    #[test]
    fn urls_without_file_name_have_no_ref() {
        assert_eq!(MediaRef::from_url("https://cdn.example.com/"), None);
        assert_eq!(MediaRef::from_url("https://cdn.example.com"), None);
    }

    #[test]
    fn extension_prefers_content_type() {
        let image = ImageUpload {
            file_name: Some("photo.JPEG".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"x"),
        };
        assert_eq!(image.extension(), "png");
        let odd = ImageUpload {
            content_type: "application/octet-stream".into(),
            ..image
        };
        assert_eq!(odd.extension(), "jpeg");
        assert!(!odd.is_allowed_type());
    }

    #[test]
    fn with_status_ignores_success_codes() {
        assert_eq!(MediaError::upload("x").with_status(StatusCode::OK).status(), None);
        assert_eq!(
            MediaError::upload("x").with_status(StatusCode::BAD_GATEWAY).status(),
            Some(StatusCode::BAD_GATEWAY)
        );
    }
}
