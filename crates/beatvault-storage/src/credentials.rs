//! Credential context: the only holder of long-lived object-store secrets.
//!
//! The context is constructed once at startup and passed explicitly to whatever signs
//! URLs. Incomplete configuration never fails construction; it is reported as a warning
//! and surfaces as a signing failure when a URL is actually requested.

use crate::traits::{StorageError, StorageResult};
use beatvault_core::StorageConfig;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Storage client handle shared by every signing call.
pub struct StorageClient {
    store: AmazonS3,
    bucket: String,
    missing: Vec<&'static str>,
}

impl StorageClient {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Whether the handle was built with empty credentials.
    pub fn has_credentials(&self) -> bool {
        self.missing.is_empty()
    }

    /// Sign `method` on `key`. Fails without contacting anything when credentials are missing.
    pub async fn signed_url(
        &self,
        method: Method,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if !self.has_credentials() {
            return Err(StorageError::ConfigError(format!(
                "object storage credentials not configured (missing: {})",
                self.missing.join(", ")
            )));
        }

        let location = Path::from(key.to_string());
        let url = self
            .store
            .signed_url(method, &location, expires_in)
            .await
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;

        Ok(url.to_string())
    }
}

/// Holds one set of endpoint + access key + secret and lazily builds the storage client.
pub struct CredentialContext {
    config: StorageConfig,
    client: OnceLock<Result<Arc<StorageClient>, String>>,
}

impl CredentialContext {
    pub fn new(config: StorageConfig) -> Self {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(
                missing = %missing.join(","),
                bucket = %config.bucket,
                "Object storage configuration incomplete; signing will fail until it is provided"
            );
        }

        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// The shared storage client, built on first use.
    pub fn client(&self) -> StorageResult<Arc<StorageClient>> {
        self.client
            .get_or_init(|| self.build_client().map(Arc::new))
            .clone()
            .map_err(StorageError::ConfigError)
    }

    fn build_client(&self) -> Result<StorageClient, String> {
        let config = &self.config;
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(config.bucket.clone())
            .with_region(config.region.clone())
            .with_access_key_id(config.access_key_id.clone().unwrap_or_default())
            .with_secret_access_key(config.secret_access_key.clone().unwrap_or_default());

        if let Some(ref endpoint) = config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder.build().map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %config.bucket,
                "Failed to build object storage client"
            );
            e.to_string()
        })?;

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "Object storage client initialized"
        );

        Ok(StorageClient {
            store,
            bucket: config.bucket.clone(),
            missing: config.missing_fields(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> StorageConfig {
        StorageConfig {
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("minio".to_string()),
            secret_access_key: Some("minio-secret".to_string()),
            bucket: "beats".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_client_is_built_once_and_shared() {
        let ctx = CredentialContext::new(complete_config());
        let a = ctx.client().unwrap();
        let b = ctx.client().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.bucket(), "beats");
        assert!(a.has_credentials());
    }

    #[tokio::test]
    async fn test_missing_credentials_start_but_fail_at_sign_time() {
        let ctx = CredentialContext::new(StorageConfig {
            bucket: "beats".to_string(),
            region: "auto".to_string(),
            ..Default::default()
        });

        let client = ctx.client().unwrap();
        assert!(!client.has_credentials());

        let result = client
            .signed_url(Method::GET, "covers/a.png", Duration::from_secs(60))
            .await;
        match result {
            Err(StorageError::ConfigError(msg)) => assert!(msg.contains("S3_SECRET_ACCESS_KEY")),
            other => panic!("expected ConfigError, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_signed_url_is_bound_to_key() {
        let ctx = CredentialContext::new(complete_config());
        let client = ctx.client().unwrap();
        let url = client
            .signed_url(Method::GET, "covers/a.png", Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:9000/beats/covers/a.png?"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }
}
