//! Files staged into upload slots.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::path::Path;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A local file held by the session until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Stage in-memory bytes, guessing the content type from the file name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name);
        Self::new(name, content_type, data.into())
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Staged file path has no usable file name")?
            .to_string();
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read staged file {}", path.display()))?;

        Ok(Self::from_bytes(name, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Content type sent with the upload. Unknown extensions upload as opaque bytes.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        // Cover art
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aiff" | "aif" => "audio/aiff",
        // Stem archives
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for("Cover.PNG"), "image/png");
        assert_eq!(content_type_for("beat.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("stems.rar"), "application/vnd.rar");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path_reads_bytes_and_name() {
        let mut file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .unwrap();
        file.write_all(b"RIFF....WAVE").unwrap();

        let staged = StagedFile::from_path(file.path()).await.unwrap();

        assert!(staged.name.ends_with(".wav"));
        assert_eq!(staged.content_type, "audio/wav");
        assert_eq!(staged.len(), 12);
    }

    #[tokio::test]
    async fn test_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = StagedFile::from_path(dir.path().join("gone.mp3")).await;
        assert!(result.is_err());
    }
}
