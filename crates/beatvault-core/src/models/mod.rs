//! Data models for the application
//!
//! Each sub-module represents a specific feature area: product metadata collected by
//! the upload wizard, the slot/step vocabulary of an upload session, and the signed-URL
//! capability together with its wire shapes.

mod product;
pub mod signed_url;
mod upload;

// Re-export all models for convenient imports
pub use product::*;
pub use signed_url::*;
pub use upload::*;
