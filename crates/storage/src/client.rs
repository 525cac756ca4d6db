//! S3 object-store client.

use aws_sdk_s3::primitives::ByteStream;

use atelier_core::object_key::UPLOAD_PREFIX;

use crate::error::StorageError;

/// Object-store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding all uploaded media.
    pub bucket: String,
    /// Base URL under which uploaded objects are publicly reachable,
    /// without a trailing slash (e.g. a CDN or the bucket website URL).
    pub public_base_url: String,
    /// Key prefix for uploads (default: `portfolio`).
    pub key_prefix: String,
    /// Custom endpoint for S3-compatible stores (MinIO etc.); `None` uses
    /// the AWS default resolution.
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Env Var               | Required | Default     |
    /// |-----------------------|----------|-------------|
    /// | `S3_BUCKET`           | **yes**  | --          |
    /// | `S3_PUBLIC_BASE_URL`  | **yes**  | --          |
    /// | `S3_KEY_PREFIX`       | no       | `portfolio` |
    /// | `S3_ENDPOINT`         | no       | --          |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing; storage misconfiguration
    /// should fail at startup, not on the first upload.
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
        let public_base_url = std::env::var("S3_PUBLIC_BASE_URL")
            .expect("S3_PUBLIC_BASE_URL must be set")
            .trim_end_matches('/')
            .to_string();
        let key_prefix =
            std::env::var("S3_KEY_PREFIX").unwrap_or_else(|_| UPLOAD_PREFIX.to_string());
        let endpoint = std::env::var("S3_ENDPOINT").ok();

        Self {
            bucket,
            public_base_url,
            key_prefix,
            endpoint,
        }
    }
}

/// Client for the media bucket.
///
/// Cheaply cloneable; the inner SDK client is already reference-counted.
#[derive(Clone)]
pub struct ObjectStore {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl ObjectStore {
    /// Connect using ambient AWS credentials and the given configuration.
    pub async fn connect(config: StorageConfig) -> Self {
        let shared = aws_config::load_from_env().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = config.endpoint.as_deref() {
            // Path-style addressing for MinIO-style endpoints.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());
        Self { client, config }
    }

    /// The configured upload key prefix.
    pub fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    /// Upload a file and return its public URL.
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(key, "Object uploaded");
        Ok(self.public_url(key))
    }

    /// Delete an object by key.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Best-effort delete by public URL.
    ///
    /// Used by project deletion, which removes the database record whether
    /// or not the files could be cleaned up. Failures (including URLs that
    /// do not point into this bucket) are logged and swallowed.
    pub async fn delete_url_best_effort(&self, url: &str) {
        let Some(key) = self.key_for_url(url) else {
            tracing::warn!(url, "Skipping delete: URL is not in the media bucket");
            return;
        };
        let key = key.to_string();
        if let Err(e) = self.delete(&key).await {
            tracing::warn!(key, error = %e, "Best-effort object delete failed");
        } else {
            tracing::debug!(key, "Object deleted");
        }
    }

    /// The public URL for a stored object.
    pub fn public_url(&self, key: &str) -> String {
        url_for(&self.config.public_base_url, key)
    }

    /// Recover the object key from a public URL, if it belongs to this
    /// store.
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        key_from(&self.config.public_base_url, url)
    }
}

/// Join the public base URL and an object key.
fn url_for(base_url: &str, key: &str) -> String {
    format!("{base_url}/{key}")
}

/// Strip the public base URL from an object URL, yielding the key.
fn key_from<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base_url)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
}
