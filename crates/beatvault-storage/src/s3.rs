use crate::credentials::CredentialContext;
use crate::traits::{StorageResult, UrlSigner};
use async_trait::async_trait;
use beatvault_core::UrlOperation;
use http::Method;
use std::sync::Arc;
use std::time::Duration;

/// S3-compatible signer backed by the shared credential context.
#[derive(Clone)]
pub struct S3Signer {
    credentials: Arc<CredentialContext>,
}

impl S3Signer {
    pub fn new(credentials: Arc<CredentialContext>) -> Self {
        Self { credentials }
    }
}

fn method_for(operation: UrlOperation) -> Method {
    match operation {
        UrlOperation::Read => Method::GET,
        UrlOperation::Write => Method::PUT,
    }
}

#[async_trait]
impl UrlSigner for S3Signer {
    async fn sign(
        &self,
        operation: UrlOperation,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let start = std::time::Instant::now();
        let client = self.credentials.client()?;

        let url = client
            .signed_url(method_for(operation), key, expires_in)
            .await?;

        tracing::debug!(
            bucket = %client.bucket(),
            key = %key,
            method = operation.http_method(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 URL signed"
        );

        Ok(url)
    }
}
