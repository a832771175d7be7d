//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use beatvault_core::Config;

/// Validate critical configuration values.
///
/// Storage credentials are deliberately not checked here: the service must start without
/// them and fail only the requests that need signing.
pub fn validate_config(config: &Config) -> Result<()> {
    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    config.validate()?;

    if !config.storage().is_complete() {
        tracing::warn!(
            missing = %config.storage().missing_fields().join(","),
            "Object storage credentials incomplete; /sign-url will answer 500 until configured"
        );
    }

    Ok(())
}
