//! Object key normalization and upload key derivation.
//!
//! Read keys: exactly one leading `/` is stripped, nothing else changes.
//! Upload keys: `{owner_id}/{session_id}/{slot}.{ext}`.

use crate::traits::{StorageError, StorageResult};
use beatvault_core::constants::FALLBACK_EXTENSION;
use beatvault_core::Slot;
use std::path::Path;
use uuid::Uuid;

/// Normalize a caller-supplied key for the backend.
///
/// Fails with `MissingKey` when the key is absent, empty, or nothing but the separator.
pub fn normalize_key(raw: Option<&str>) -> StorageResult<&str> {
    let raw = raw.ok_or(StorageError::MissingKey)?;
    let key = raw.strip_prefix('/').unwrap_or(raw);
    if key.is_empty() {
        return Err(StorageError::MissingKey);
    }
    Ok(key)
}

/// Derive the object key a slot upload is written to.
///
/// The owner and session scope keep keys collision-free per producer; the slot name keeps
/// them stable for later catalog lookup.
pub fn derive_upload_key(
    owner_id: &str,
    session_id: Uuid,
    slot: Slot,
    filename: &str,
) -> StorageResult<String> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(StorageError::InvalidKey("Owner id is required".to_string()));
    }
    if owner_id.contains('/') || owner_id == "." || owner_id == ".." {
        return Err(StorageError::InvalidKey(format!(
            "Owner id contains invalid characters: {}",
            owner_id
        )));
    }

    Ok(format!(
        "{}/{}/{}.{}",
        owner_id,
        session_id,
        slot.as_str(),
        upload_extension(filename)
    ))
}

/// Lowercased extension of `filename`, or the fallback when it has none usable.
pub fn upload_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
