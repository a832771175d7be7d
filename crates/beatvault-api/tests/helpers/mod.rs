//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p beatvault-api --test sign_url_test`.

use async_trait::async_trait;
use axum_test::TestServer;
use beatvault_api::setup::{routes, storage};
use beatvault_api::state::AppState;
use beatvault_core::{BaseConfig, Config, StorageConfig, UrlOperation};
use beatvault_storage::{SignedUrlBroker, StorageError, StorageResult, UrlSigner};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded signing request.
#[derive(Debug, Clone)]
pub struct SignCall {
    pub operation: UrlOperation,
    pub key: String,
    pub expires_in: Duration,
}

/// Signer double: records every call, then either returns a fake URL or fails with a
/// backend-looking error.
#[derive(Default)]
pub struct FakeSigner {
    calls: Mutex<Vec<SignCall>>,
    failure: Option<String>,
}

impl FakeSigner {
    pub fn failing(detail: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(detail.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<SignCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlSigner for FakeSigner {
    async fn sign(
        &self,
        operation: UrlOperation,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.calls.lock().unwrap().push(SignCall {
            operation,
            key: key.to_string(),
            expires_in,
        });
        match &self.failure {
            Some(detail) => Err(StorageError::SigningFailed(detail.clone())),
            None => Ok(format!(
                "https://storage.test/beats/{}?X-Amz-Expires={}&op={}",
                key,
                expires_in.as_secs(),
                operation
            )),
        }
    }
}

pub fn create_test_config(storage: StorageConfig) -> Config {
    Config::new(
        BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            request_timeout_secs: 5,
            http_concurrency_limit: 64,
        },
        storage,
    )
}

/// Test application: server plus the signer double it signs through.
pub struct TestApp {
    pub server: TestServer,
    pub signer: Arc<FakeSigner>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn serve(config: Config, broker: SignedUrlBroker) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), broker));
    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    TestServer::new(app).expect("Failed to start test server")
}

/// App whose broker signs through a recording fake.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(FakeSigner::default())
}

pub fn setup_test_app_with(signer: FakeSigner) -> TestApp {
    let signer = Arc::new(signer);
    let broker = SignedUrlBroker::new(signer.clone());
    TestApp {
        server: serve(create_test_config(StorageConfig::default()), broker),
        signer,
    }
}

/// App wired exactly as in production but with no object-store credentials configured.
pub fn setup_unconfigured_app() -> TestServer {
    let config = create_test_config(StorageConfig {
        bucket: "beats".to_string(),
        region: "auto".to_string(),
        ..Default::default()
    });
    let broker = storage::setup_broker(&config);
    serve(config, broker)
}
