//! S3-compatible media host (AWS S3, MinIO, R2).

use super::{ImageUpload, MediaError, MediaHost, MediaRef};
use crate::config::MediaConfig;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use axum::http::StatusCode;
use uuid::Uuid;

#[derive(Clone)]
pub struct S3MediaHost {
    client: Client,
    bucket: String,
    folder: String,
    public_base: String,
}

impl S3MediaHost {
    pub async fn new(config: &MediaConfig) -> Self {
        let creds = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "recipe-api",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(creds)
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            folder: config.folder.trim_matches('/').to_string(),
            public_base: config.public_base_url().trim_end_matches('/').to_string(),
        }
    }

    fn key(&self, file_name: &str) -> String {
        if self.folder.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.folder, file_name)
        }
    }
}

fn upstream_status<E>(err: &SdkError<E>) -> Option<StatusCode> {
    err.raw_response()
        .and_then(|r| StatusCode::from_u16(r.status().as_u16()).ok())
}

#[async_trait]
impl MediaHost for S3MediaHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), image.extension());
        let key = self.key(&file_name);
        tracing::debug!(bucket = %self.bucket, key = %key, bytes = image.bytes.len(), "put_object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&image.content_type)
            .body(ByteStream::from(image.bytes))
            .send()
            .await
            .map_err(|e| {
                let err = MediaError::upload(DisplayErrorContext(&e).to_string());
                match upstream_status(&e) {
                    Some(status) => err.with_status(status),
                    None => err,
                }
            })?;
        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, media: &MediaRef) -> Result<(), MediaError> {
        let key = self.key(&media.file_name());
        tracing::debug!(bucket = %self.bucket, key = %key, "delete_object");
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let err = MediaError::delete(DisplayErrorContext(&e).to_string());
                match upstream_status(&e) {
                    Some(status) => err.with_status(status),
                    None => err,
                }
            })?;
        Ok(())
    }
}
