//! Configuration module
//!
//! This module provides configuration structures for the broker service: server
//! settings and the object-store endpoint/credentials consumed by the credential context.

use std::env;

use crate::constants::{DEFAULT_BUCKET, DEFAULT_REGION};

// Common constants
const SERVER_PORT: u16 = 4000;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
}

/// Object-store endpoint and credentials.
///
/// Endpoint and credentials are optional on purpose: a missing value never stops the
/// service from starting, it only makes signing fail at call time.
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    pub region: String,
}

impl StorageConfig {
    /// Names of the required credential fields that are missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.endpoint) {
            missing.push("S3_ENDPOINT");
        }
        if is_blank(&self.access_key_id) {
            missing.push("S3_ACCESS_KEY_ID");
        }
        if is_blank(&self.secret_access_key) {
            missing.push("S3_SECRET_ACCESS_KEY");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn new(base: BaseConfig, storage: StorageConfig) -> Self {
        Self { base, storage }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: parse_list(&cors_origins_str),
            environment,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
        };

        let storage = StorageConfig {
            endpoint: non_empty_var("S3_ENDPOINT"),
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID")
                .or_else(|| non_empty_var("AWS_ACCESS_KEY_ID")),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY")
                .or_else(|| non_empty_var("AWS_SECRET_ACCESS_KEY")),
            bucket: non_empty_var("S3_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: non_empty_var("S3_REGION")
                .or_else(|| non_empty_var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        };

        let config = Config { base, storage };
        config.validate()?;
        Ok(config)
    }

    /// Validate server settings. Storage credentials are deliberately not checked here.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be greater than 0"));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }
}

pub fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
