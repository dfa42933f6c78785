//! Cover image uploads
//!
//! Files are written under a server-generated name (`<uuid><.ext>`); the
//! client's file name only contributes its extension.

pub mod handlers;

use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};

pub struct UploadManager {
    dir: PathBuf,
}

impl UploadManager {
    /// `dir` must already exist; it is created once at startup.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under a fresh name and return that name
    pub async fn store(&self, data: &[u8], original_file_name: Option<&str>) -> Result<String> {
        let original = original_file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::InvalidInput("File name is required".to_string()))?;

        let file_name = format!("{}{}", Uuid::new_v4(), extension(original));
        if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
            return Err(Error::InvalidInput(format!(
                "Filename contains invalid path sequence {}",
                file_name
            )));
        }

        let target = self.dir.join(&file_name);
        tokio::fs::write(&target, data).await.map_err(|e| {
            error!("[Uploads] Could not store file {}: {}", file_name, e);
            Error::StorageUnavailable(format!("Could not store file {}", file_name))
        })?;

        info!("[Uploads] Stored {} ({} bytes)", file_name, data.len());
        Ok(file_name)
    }
}

/// `.ext` of the last path component, or empty.
///
/// Dot-files (`.bashrc`) have no extension, and anything that is not plain
/// ASCII alphanumerics is dropped.
pub fn extension(original_file_name: &str) -> &str {
    let base = original_file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_file_name);

    match base.rfind('.') {
        Some(i) if i > 0 => {
            let ext = &base[i..];
            if ext.len() > 1 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
                ext
            } else {
                ""
            }
        }
        _ => "",
    }
}
