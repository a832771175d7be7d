//! Storage setup and initialization

use beatvault_core::Config;
use beatvault_storage::{CredentialContext, S3Signer, SignedUrlBroker};
use std::sync::Arc;

/// Build the process-wide credential context and the broker that signs through it.
///
/// Never fails: a context with missing credentials still starts and reports the problem
/// on the first signing request.
pub fn setup_broker(config: &Config) -> SignedUrlBroker {
    tracing::info!(
        bucket = %config.storage().bucket,
        region = %config.storage().region,
        "Initializing object storage credentials..."
    );
    let credentials = Arc::new(CredentialContext::new(config.storage().clone()));
    let signer = Arc::new(S3Signer::new(credentials));
    SignedUrlBroker::new(signer)
}
