//! Object storage contract and the S3 implementation.
//!
//! Uploads are durable and immediately readable; every object is
//! addressable by a caller-generated collision-free name.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::ServiceError;

/// Durable blob storage with public read URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError>;

    /// Public URL for an object name (no existence check).
    fn public_url(&self, name: &str) -> String;
}

/// S3-compatible implementation.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Create a storage client for one bucket.
    ///
    /// * `public_base_url` - base URL under which uploaded objects are
    ///   publicly readable, e.g. `https://cdn.example.com/images`.
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Build an S3 client from ambient AWS configuration (env vars,
    /// profile, instance metadata).
    pub async fn from_env(bucket: String, public_base_url: String) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, public_base_url)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("put_object {name}: {e}")))?;

        tracing::debug!(bucket = %self.bucket, key = %name, "Uploaded object");

        Ok(self.public_url(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), name)
    }
}
