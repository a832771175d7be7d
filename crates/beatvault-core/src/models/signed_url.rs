use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::Slot;

/// The single operation a signed URL grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlOperation {
    Read,
    Write,
}

impl UrlOperation {
    /// HTTP method the object store expects for this operation.
    pub fn http_method(&self) -> &'static str {
        match self {
            UrlOperation::Read => "GET",
            UrlOperation::Write => "PUT",
        }
    }
}

impl Display for UrlOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UrlOperation::Read => write!(f, "read"),
            UrlOperation::Write => write!(f, "write"),
        }
    }
}

/// A capability for one operation on one object key, valid until `expires_at`.
///
/// Signed URLs cannot be revoked. Anyone who observed the URL can use it until expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub url: String,
    pub key: String,
    pub operation: UrlOperation,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    pub fn new(
        url: String,
        key: String,
        operation: UrlOperation,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            url,
            key,
            operation,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// The URL is usable strictly before its expiry instant.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at < self.expires_at
    }

    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        !self.is_valid_at(at)
    }
}

/// Body of `POST /sign-url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUrlRequest {
    #[serde(default)]
    pub key: Option<String>,
}

/// Response of `POST /sign-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUrlResponse {
    pub download_url: String,
}

/// Body of `POST /sign-upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadUrlRequest {
    #[serde(default)]
    pub owner_id: Option<String>,
    pub session_id: Uuid,
    pub slot: Slot,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Response of `POST /sign-upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadUrlResponse {
    pub upload_url: String,
    /// Object key the upload URL is bound to. Retained by the client for the catalog.
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued(at: DateTime<Utc>) -> SignedUrl {
        SignedUrl::new(
            "https://storage.example.com/beats/cover.png?sig=abc".to_string(),
            "beats/cover.png".to_string(),
            UrlOperation::Read,
            at,
            Duration::seconds(3600),
        )
    }

    #[test]
    fn test_signed_url_expiry_window() {
        let t = Utc::now();
        let url = issued(t);
        assert!(url.is_valid_at(t + Duration::seconds(3599)));
        assert!(url.is_expired_at(t + Duration::seconds(3600)));
        assert!(url.is_expired_at(t + Duration::seconds(3601)));
    }

    #[test]
    fn test_sign_url_request_tolerates_missing_and_null_key() {
        let missing: SignUrlRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.key.is_none());
        let null: SignUrlRequest = serde_json::from_str(r#"{"key":null}"#).unwrap();
        assert!(null.key.is_none());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let response = SignUrlResponse {
            download_url: "https://x".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["downloadUrl"], "https://x");

        let request: SignUploadUrlRequest = serde_json::from_str(
            r#"{"ownerId":"producer-1","sessionId":"67e55044-10b1-426f-9247-bb680e5fe0c8","slot":"mp3Tagged","filename":"beat.mp3"}"#,
        )
        .unwrap();
        assert_eq!(request.slot, Slot::Mp3Tagged);
        assert_eq!(request.owner_id.as_deref(), Some("producer-1"));
    }

    #[test]
    fn test_operation_methods() {
        assert_eq!(UrlOperation::Read.http_method(), "GET");
        assert_eq!(UrlOperation::Write.http_method(), "PUT");
    }
}
