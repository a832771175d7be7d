//! Signed-URL broker.
//!
//! Stateless: every call normalizes the key, signs it for the fixed lifetime and returns
//! the capability. Nothing about issued URLs is retained.

use crate::keys::{derive_upload_key, normalize_key};
use crate::traits::{StorageError, StorageResult, UrlSigner};
use beatvault_core::constants::SIGNED_URL_TTL_SECS;
use beatvault_core::{SignedUrl, Slot, UrlOperation};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct SignedUrlBroker {
    signer: Arc<dyn UrlSigner>,
    ttl: Duration,
}

impl SignedUrlBroker {
    pub fn new(signer: Arc<dyn UrlSigner>) -> Self {
        Self {
            signer,
            ttl: Duration::from_secs(SIGNED_URL_TTL_SECS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a read URL for `raw_key`.
    pub async fn issue_read_url(&self, raw_key: Option<&str>) -> StorageResult<SignedUrl> {
        self.issue_at(UrlOperation::Read, raw_key, Utc::now()).await
    }

    /// Issue a write URL for `raw_key`. Same normalization and lifetime as reads.
    pub async fn issue_write_url(&self, raw_key: Option<&str>) -> StorageResult<SignedUrl> {
        self.issue_at(UrlOperation::Write, raw_key, Utc::now()).await
    }

    /// Issue a write URL for one slot of an upload session, deriving its key.
    pub async fn issue_upload_url(
        &self,
        owner_id: &str,
        session_id: Uuid,
        slot: Slot,
        filename: &str,
    ) -> StorageResult<SignedUrl> {
        let key = derive_upload_key(owner_id, session_id, slot, filename)?;
        self.issue_write_url(Some(&key)).await
    }

    /// Issue a URL with `now` as the issuance instant.
    pub async fn issue_at(
        &self,
        operation: UrlOperation,
        raw_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> StorageResult<SignedUrl> {
        let key = normalize_key(raw_key)?;

        let url = self
            .signer
            .sign(operation, key, self.ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    operation = %operation,
                    "Failed to sign URL"
                );
                match e {
                    StorageError::MissingKey | StorageError::InvalidKey(_) => e,
                    other => StorageError::SigningFailed(other.to_string()),
                }
            })?;

        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::info!(
            key = %key,
            operation = %operation,
            ttl_secs = self.ttl.as_secs(),
            "Signed URL issued"
        );

        Ok(SignedUrl::new(url, key.to_string(), operation, now, ttl))
    }
}
