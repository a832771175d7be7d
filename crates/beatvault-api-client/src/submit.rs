//! Submission pipeline for an upload session.
//!
//! For every occupied slot that has not been uploaded yet: request a write URL from the
//! broker, PUT the staged bytes straight to the object store, and record the per-slot
//! outcome on the session. Transfers run concurrently and never abort each other. Only
//! when every occupied slot has succeeded is the product handed to the catalog.

use crate::session::UploadSession;
use crate::staged::StagedFile;
use async_trait::async_trait;
use beatvault_core::models::signed_url::{SignUploadUrlRequest, SignUploadUrlResponse};
use beatvault_core::{ProductMetadata, Slot};
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Per-slot transfer failure, classified by what a retry needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The URL expired before or during the transfer; a fresh URL is required.
    #[error("Upload URL expired")]
    Expired,

    /// Network failure or a transient store status; the same slot can be retried.
    #[error("Transfer failed: {0}")]
    Retryable(String),

    /// The store refused the object; retrying unchanged will fail again.
    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The broker would not issue an upload URL.
    #[error("Could not obtain upload URL: {0}")]
    Broker(String),
}

impl TransferError {
    /// Whether submitting again without changing the staged file can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::Rejected { .. })
    }

    /// Classify an object-store response status.
    pub fn from_status(status: StatusCode, body: &str) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        let message = body.chars().take(200).collect::<String>();
        Some(match status {
            StatusCode::FORBIDDEN => TransferError::Expired,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                TransferError::Retryable(format!("status {}", status.as_u16()))
            }
            s if s.is_server_error() => {
                TransferError::Retryable(format!("status {}: {}", s.as_u16(), message))
            }
            s => TransferError::Rejected {
                status: s.as_u16(),
                message,
            },
        })
    }
}

/// Outcome of the latest transfer attempt for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotTransfer {
    NotAttempted,
    Succeeded {
        key: String,
    },
    /// `key` is absent when the broker never issued one.
    Failed {
        key: Option<String>,
        error: TransferError,
    },
}

impl SlotTransfer {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, SlotTransfer::Succeeded { .. })
    }
}

/// What the catalog receives once every slot is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubmission {
    pub owner_id: String,
    pub session_id: Uuid,
    pub assets: BTreeMap<Slot, String>,
    pub metadata: ProductMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every slot uploaded and the product was registered. The session has been reset.
    Completed { product: ProductSubmission },
    /// Some slots failed. Succeeded keys are kept on the session; submitting again only
    /// retries `failed`.
    Partial {
        succeeded: BTreeMap<Slot, String>,
        failed: BTreeMap<Slot, TransferError>,
    },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("No files staged")]
    NothingStaged,

    /// All transfers succeeded but registration failed. The session keeps its uploaded
    /// keys, so a retry only repeats the registration.
    #[error("Catalog registration failed: {0}")]
    Catalog(#[source] anyhow::Error),
}

/// Issues write URLs for session slots. Implemented by [`crate::ApiClient`].
#[async_trait]
pub trait UploadUrlIssuer: Send + Sync {
    async fn issue_upload_url(
        &self,
        request: &SignUploadUrlRequest,
    ) -> anyhow::Result<SignUploadUrlResponse>;
}

/// Moves staged bytes to a signed write URL.
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    async fn put(&self, url: &str, file: &StagedFile) -> Result<(), TransferError>;
}

/// Persists a finished product. The catalog itself lives elsewhere.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    async fn register(&self, product: &ProductSubmission) -> anyhow::Result<()>;
}

/// Direct-to-store PUT over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// No overall timeout here. The submitter bounds each transfer by its URL's expiry.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectTransport for HttpTransport {
    async fn put(&self, url: &str, file: &StagedFile) -> Result<(), TransferError> {
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.data.clone())
            .send()
            .await
            .map_err(|e| TransferError::Retryable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        match TransferError::from_status(status, &body) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Runs submissions against a broker, an object store, and a catalog.
#[derive(Clone)]
pub struct Submitter {
    issuer: Arc<dyn UploadUrlIssuer>,
    transport: Arc<dyn ObjectTransport>,
    catalog: Arc<dyn CatalogSink>,
}

impl Submitter {
    pub fn new(
        issuer: Arc<dyn UploadUrlIssuer>,
        transport: Arc<dyn ObjectTransport>,
        catalog: Arc<dyn CatalogSink>,
    ) -> Self {
        Self {
            issuer,
            transport,
            catalog,
        }
    }

    /// Submit `session`.
    ///
    /// Slots that already succeeded in an earlier attempt are not uploaded again. On
    /// completion the session is discarded and replaced by a fresh one.
    pub async fn submit(
        &self,
        session: &mut UploadSession,
    ) -> Result<SubmitOutcome, SubmitError> {
        if session.slots().next().is_none() {
            return Err(SubmitError::NothingStaged);
        }

        let results = {
            let snapshot: &UploadSession = session;
            let pending: Vec<(Slot, &StagedFile)> = snapshot
                .slots()
                .filter(|(slot, _)| !snapshot.transfer(*slot).is_succeeded())
                .collect();

            tracing::info!(
                session_id = %snapshot.id(),
                pending = pending.len(),
                "Submitting upload session"
            );

            let transfers = pending
                .into_iter()
                .map(|(slot, file)| self.transfer_slot(snapshot, slot, file));
            futures::future::join_all(transfers).await
        };

        for (slot, transfer) in results {
            session.record_transfer(slot, transfer);
        }

        let mut failed = BTreeMap::new();
        for (slot, _) in session.slots() {
            if let SlotTransfer::Failed { error, .. } = session.transfer(slot) {
                failed.insert(slot, error.clone());
            }
        }

        if !failed.is_empty() {
            tracing::warn!(
                session_id = %session.id(),
                failed = ?failed.keys().collect::<Vec<_>>(),
                "Upload session partially submitted"
            );
            return Ok(SubmitOutcome::Partial {
                succeeded: session.uploaded_keys(),
                failed,
            });
        }

        let mut metadata = session.metadata().clone();
        metadata.visibility = metadata.visibility.finalized();
        let product = ProductSubmission {
            owner_id: session.owner_id().to_string(),
            session_id: session.id(),
            assets: session.uploaded_keys(),
            metadata,
        };

        self.catalog
            .register(&product)
            .await
            .map_err(SubmitError::Catalog)?;

        tracing::info!(
            session_id = %product.session_id,
            assets = product.assets.len(),
            "Product registered"
        );

        session.discard();
        Ok(SubmitOutcome::Completed { product })
    }

    async fn transfer_slot(
        &self,
        session: &UploadSession,
        slot: Slot,
        file: &StagedFile,
    ) -> (Slot, SlotTransfer) {
        let request = SignUploadUrlRequest {
            owner_id: Some(session.owner_id().to_string()),
            session_id: session.id(),
            slot,
            filename: Some(file.name.clone()),
        };

        let signed = match self.issuer.issue_upload_url(&request).await {
            Ok(signed) => signed,
            Err(e) => {
                tracing::error!(slot = %slot, error = %e, "Failed to obtain upload URL");
                return (
                    slot,
                    SlotTransfer::Failed {
                        key: None,
                        error: TransferError::Broker(e.to_string()),
                    },
                );
            }
        };

        // A transfer still running when the URL expires is counted as expired.
        let result = match (signed.expires_at - Utc::now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                match tokio::time::timeout(remaining, self.transport.put(&signed.upload_url, file))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TransferError::Expired),
                }
            }
            _ => Err(TransferError::Expired),
        };

        match result {
            Ok(()) => {
                tracing::debug!(slot = %slot, key = %signed.key, bytes = file.len(), "Slot uploaded");
                (slot, SlotTransfer::Succeeded { key: signed.key })
            }
            Err(error) => {
                tracing::warn!(slot = %slot, key = %signed.key, error = %error, "Slot upload failed");
                (
                    slot,
                    SlotTransfer::Failed {
                        key: Some(signed.key),
                        error,
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatvault_core::models::MetadataField;
    use beatvault_core::Visibility;
    use std::sync::Mutex;

    /// Issues URLs on the fake store; slots listed in `expired` get an already-expired URL.
    #[derive(Default)]
    struct FakeIssuer {
        requests: Mutex<Vec<SignUploadUrlRequest>>,
        expired: Mutex<Vec<Slot>>,
        unavailable: bool,
        lifetime: Option<chrono::Duration>,
    }

    impl FakeIssuer {
        fn expiring(slots: &[Slot]) -> Self {
            Self {
                expired: Mutex::new(slots.to_vec()),
                ..Default::default()
            }
        }

        fn requested_slots(&self) -> Vec<Slot> {
            self.requests.lock().unwrap().iter().map(|r| r.slot).collect()
        }

        fn renew(&self) {
            self.expired.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl UploadUrlIssuer for FakeIssuer {
        async fn issue_upload_url(
            &self,
            request: &SignUploadUrlRequest,
        ) -> anyhow::Result<SignUploadUrlResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if self.unavailable {
                anyhow::bail!("API request failed with status 500 Internal Server Error");
            }
            let key = format!(
                "{}/{}/{}",
                request.owner_id.as_deref().unwrap_or_default(),
                request.session_id,
                request.slot
            );
            let expires_at = if self.expired.lock().unwrap().contains(&request.slot) {
                Utc::now() - chrono::Duration::seconds(1)
            } else {
                Utc::now() + self.lifetime.unwrap_or(chrono::Duration::seconds(3600))
            };
            Ok(SignUploadUrlResponse {
                upload_url: format!("https://store.test/{}", key),
                key,
                expires_at,
            })
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        puts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectTransport for FakeTransport {
        async fn put(&self, url: &str, _file: &StagedFile) -> Result<(), TransferError> {
            self.puts.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    /// A store that outlasts any short-lived URL.
    struct SlowTransport;

    #[async_trait]
    impl ObjectTransport for SlowTransport {
        async fn put(&self, _url: &str, _file: &StagedFile) -> Result<(), TransferError> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        products: Mutex<Vec<ProductSubmission>>,
        down: bool,
    }

    #[async_trait]
    impl CatalogSink for FakeCatalog {
        async fn register(&self, product: &ProductSubmission) -> anyhow::Result<()> {
            if self.down {
                anyhow::bail!("catalog unavailable");
            }
            self.products.lock().unwrap().push(product.clone());
            Ok(())
        }
    }

    fn staged_session() -> UploadSession {
        let mut session = UploadSession::new("producer-1");
        session.assign_slot(Slot::Cover, StagedFile::from_bytes("cover.png", vec![1, 2, 3]));
        session.assign_slot(Slot::Mp3Tagged, StagedFile::from_bytes("beat.mp3", vec![4, 5]));
        session.update_metadata_field(MetadataField::Title("Track One".to_string()));
        session
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(TransferError::from_status(StatusCode::OK, ""), None);
        assert_eq!(
            TransferError::from_status(StatusCode::FORBIDDEN, "Request has expired"),
            Some(TransferError::Expired)
        );
        assert!(matches!(
            TransferError::from_status(StatusCode::SERVICE_UNAVAILABLE, "slow down"),
            Some(TransferError::Retryable(_))
        ));
        assert!(matches!(
            TransferError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            Some(TransferError::Retryable(_))
        ));
        let rejected = TransferError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "too big");
        assert!(matches!(
            rejected,
            Some(TransferError::Rejected { status: 413, .. })
        ));
        assert!(!rejected.unwrap().is_retryable());
        assert!(TransferError::Expired.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_session_is_not_submitted() {
        let issuer = Arc::new(FakeIssuer::default());
        let submitter = Submitter::new(
            issuer.clone(),
            Arc::new(FakeTransport::default()),
            Arc::new(FakeCatalog::default()),
        );
        let mut session = UploadSession::new("p");

        let result = submitter.submit(&mut session).await;
        assert!(matches!(result, Err(SubmitError::NothingStaged)));
        assert!(issuer.requested_slots().is_empty());
    }

    #[tokio::test]
    async fn test_full_success_registers_and_resets() {
        let catalog = Arc::new(FakeCatalog::default());
        let transport = Arc::new(FakeTransport::default());
        let submitter = Submitter::new(
            Arc::new(FakeIssuer::default()),
            transport.clone(),
            catalog.clone(),
        );
        let mut session = staged_session();
        let session_id = session.id();

        let outcome = submitter.submit(&mut session).await.unwrap();

        let product = match outcome {
            SubmitOutcome::Completed { product } => product,
            other => panic!("expected Completed, got {:?}", other),
        };
        assert_eq!(product.session_id, session_id);
        assert_eq!(product.metadata.title, "Track One");
        assert_eq!(product.metadata.visibility, Visibility::Private);
        assert_eq!(
            product.assets.keys().copied().collect::<Vec<_>>(),
            vec![Slot::Cover, Slot::Mp3Tagged]
        );
        assert_eq!(transport.puts.lock().unwrap().len(), 2);
        assert_eq!(catalog.products.lock().unwrap().len(), 1);

        assert_ne!(session.id(), session_id);
        assert_eq!(session.slots().count(), 0);
    }

    #[tokio::test]
    async fn test_expired_slot_is_partial_and_retry_only_touches_it() {
        let issuer = Arc::new(FakeIssuer::expiring(&[Slot::Mp3Tagged]));
        let transport = Arc::new(FakeTransport::default());
        let catalog = Arc::new(FakeCatalog::default());
        let submitter = Submitter::new(issuer.clone(), transport.clone(), catalog.clone());
        let mut session = staged_session();

        let outcome = submitter.submit(&mut session).await.unwrap();

        match outcome {
            SubmitOutcome::Partial { succeeded, failed } => {
                assert_eq!(succeeded.keys().copied().collect::<Vec<_>>(), vec![Slot::Cover]);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed.get(&Slot::Mp3Tagged), Some(&TransferError::Expired));
            }
            other => panic!("expected Partial, got {:?}", other),
        }
        assert!(session.transfer(Slot::Cover).is_succeeded());
        assert!(catalog.products.lock().unwrap().is_empty());
        // The expired URL was never used.
        assert_eq!(transport.puts.lock().unwrap().len(), 1);

        issuer.renew();
        let cover_key = session.uploaded_keys()[&Slot::Cover].clone();
        let outcome = submitter.submit(&mut session).await.unwrap();

        assert_eq!(
            issuer.requested_slots(),
            vec![Slot::Cover, Slot::Mp3Tagged, Slot::Mp3Tagged]
        );
        match outcome {
            SubmitOutcome::Completed { product } => {
                assert_eq!(product.assets[&Slot::Cover], cover_key);
                assert!(product.assets.contains_key(&Slot::Mp3Tagged));
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transfer_outliving_its_url_is_expired() {
        let issuer = Arc::new(FakeIssuer {
            lifetime: Some(chrono::Duration::milliseconds(200)),
            ..Default::default()
        });
        let catalog = Arc::new(FakeCatalog::default());
        let submitter = Submitter::new(issuer, Arc::new(SlowTransport), catalog.clone());
        let mut session = staged_session();
        let session_id = session.id();

        let started = std::time::Instant::now();
        let outcome = submitter.submit(&mut session).await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        match outcome {
            SubmitOutcome::Partial { succeeded, failed } => {
                assert!(succeeded.is_empty());
                assert_eq!(failed.len(), 2);
                assert!(failed.values().all(|e| *e == TransferError::Expired));
            }
            other => panic!("expected Partial, got {:?}", other),
        }
        assert!(catalog.products.lock().unwrap().is_empty());
        assert_eq!(session.id(), session_id);
        assert!(matches!(
            session.transfer(Slot::Cover),
            SlotTransfer::Failed {
                key: Some(_),
                error: TransferError::Expired
            }
        ));
    }

    #[tokio::test]
    async fn test_broker_failure_marks_every_slot_without_key() {
        let issuer = Arc::new(FakeIssuer {
            unavailable: true,
            ..Default::default()
        });
        let submitter = Submitter::new(
            issuer,
            Arc::new(FakeTransport::default()),
            Arc::new(FakeCatalog::default()),
        );
        let mut session = staged_session();

        let outcome = submitter.submit(&mut session).await.unwrap();

        match outcome {
            SubmitOutcome::Partial { succeeded, failed } => {
                assert!(succeeded.is_empty());
                assert_eq!(failed.len(), 2);
            }
            other => panic!("expected Partial, got {:?}", other),
        }
        assert!(matches!(
            session.transfer(Slot::Cover),
            SlotTransfer::Failed {
                key: None,
                error: TransferError::Broker(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_catalog_failure_keeps_uploaded_keys() {
        let transport = Arc::new(FakeTransport::default());
        let submitter = Submitter::new(
            Arc::new(FakeIssuer::default()),
            transport.clone(),
            Arc::new(FakeCatalog {
                down: true,
                ..Default::default()
            }),
        );
        let mut session = staged_session();
        let session_id = session.id();

        let result = submitter.submit(&mut session).await;

        assert!(matches!(result, Err(SubmitError::Catalog(_))));
        assert_eq!(session.id(), session_id);
        assert_eq!(session.uploaded_keys().len(), 2);
        assert_eq!(transport.puts.lock().unwrap().len(), 2);
    }
}
