//! Blob storage for uploaded resumes.
//!
//! `AppState` holds an `Arc<dyn BlobStore>`; production uses S3 (or MinIO
//! locally), tests use an in-memory map.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("could not sign retrieval URL for {key}: {message}")]
    Presign { key: String, message: String },

    #[error("delete of {key} failed: {message}")]
    Delete { key: String, message: String },
}

/// A stored object and the URL it can be fetched from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<StoredBlob, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Object key for a resume: `resumes/{owner}/{epoch_millis}_{file_name}`.
///
/// The millisecond timestamp keeps repeated uploads for the same owner from
/// overwriting each other. Path separators in the file name are replaced so
/// the object stays inside the owner's prefix.
pub fn resume_object_key(owner: &str, uploaded_at_millis: i64, file_name: &str) -> String {
    let file_name: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("resumes/{owner}/{uploaded_at_millis}_{file_name}")
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_ttl: Duration,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, url_ttl: Duration) -> Self {
        Self {
            client,
            bucket,
            url_ttl,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<StoredBlob, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded s3://{}/{}", self.bucket, key);

        let presign_err = |message: String| StorageError::Presign {
            key: key.to_string(),
            message,
        };
        let presigning = PresigningConfig::expires_in(self.url_ttl).map_err(|e| presign_err(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| presign_err(e.to_string()))?;

        Ok(StoredBlob {
            key: key.to_string(),
            url: request.uri().to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
