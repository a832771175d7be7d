//! Signing abstraction trait
//!
//! This module defines the `UrlSigner` trait the broker signs through, so the broker can
//! be exercised against a test double instead of a real object store.

use async_trait::async_trait;
use beatvault_core::UrlOperation;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key is required")]
    MissingKey,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Produces signed URLs for single objects.
///
/// Implementations receive keys that are already normalized and must not alter them.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Sign `operation` on `key`, valid for `expires_in` from now.
    async fn sign(
        &self,
        operation: UrlOperation,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
