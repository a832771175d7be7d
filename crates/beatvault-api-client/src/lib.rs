//! HTTP client for the Beatvault broker.
//!
//! Provides a minimal client with a JSON POST helper and the two broker calls,
//! plus the client-held upload session (`session`) and the pipeline that submits it
//! (`submit`).

pub mod session;
pub mod staged;
pub mod submit;

use anyhow::{Context, Result};
use async_trait::async_trait;
use beatvault_core::models::signed_url::{
    SignUploadUrlRequest, SignUploadUrlResponse, SignUrlRequest, SignUrlResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use session::UploadSession;
pub use staged::StagedFile;
pub use submit::{
    CatalogSink, HttpTransport, ObjectTransport, ProductSubmission, SlotTransfer, SubmitError,
    SubmitOutcome, Submitter, TransferError, UploadUrlIssuer,
};

const DEFAULT_API_URL: &str = "http://localhost:4000";

/// HTTP client for the broker API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: BEATVAULT_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BEATVAULT_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// Resolve a stored object key to a download URL.
    pub async fn sign_read_url(&self, key: &str) -> Result<String> {
        let request = SignUrlRequest {
            key: Some(key.to_string()),
        };
        let response: SignUrlResponse = self.post_json("/sign-url", &request).await?;
        Ok(response.download_url)
    }

    /// Request a write URL for one slot of an upload session.
    pub async fn sign_upload_url(
        &self,
        request: &SignUploadUrlRequest,
    ) -> Result<SignUploadUrlResponse> {
        self.post_json("/sign-upload-url", request).await
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl UploadUrlIssuer for ApiClient {
    async fn issue_upload_url(
        &self,
        request: &SignUploadUrlRequest,
    ) -> Result<SignUploadUrlResponse> {
        self.sign_upload_url(request).await
    }
}
