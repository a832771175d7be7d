//! Beatvault Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by the signed-URL broker service and the upload client.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ProductMetadata, SignedUrl, Slot, UrlOperation, Visibility, WizardStep,
};
