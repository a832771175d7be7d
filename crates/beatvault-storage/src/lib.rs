//! Beatvault Storage Library
//!
//! Everything that touches object-store credentials lives here: the credential context
//! that owns the single storage client, the signer that turns keys into signed URLs,
//! and the broker that applies key normalization and the fixed expiry policy.
//!
//! # Object key format
//!
//! Keys are backend-relative. A single leading `/` is stripped before signing; nothing
//! else about a read key is inspected. Upload keys are derived server-side as
//! `{owner_id}/{session_id}/{slot}.{ext}`. See the `keys` module.

pub mod broker;
pub mod credentials;
pub mod keys;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use broker::SignedUrlBroker;
pub use credentials::{CredentialContext, StorageClient};
pub use s3::S3Signer;
pub use traits::{StorageError, StorageResult, UrlSigner};
