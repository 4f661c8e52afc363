//! File-backed receipt storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted receipt upload.
pub const MAX_RECEIPT_BYTES: usize = 5 << 20;

/// A stored receipt file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub name: String,
    pub upload_date: DateTime<Utc>,
}

/// Errors that can occur when reading or writing receipts.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The name is empty, would escape the receipt directory, or cannot be
    /// quoted in a `Content-Disposition` header.
    #[error("Invalid receipt name: {0:?}")]
    InvalidName(String),

    /// No receipt has the requested name.
    #[error("Receipt not found: {0}")]
    NotFound(String),

    /// Filesystem error.
    #[error("Receipt storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receipts kept as plain files in one directory, addressed by file name.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    /// Creates a store over `dir`. The directory is created on first upload.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The receipt directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists stored receipts by name.
    pub async fn list(&self) -> Result<Vec<Receipt>, ReceiptError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut receipts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            receipts.push(Receipt {
                name: entry.file_name().to_string_lossy().into_owned(),
                upload_date: metadata.modified()?.into(),
            });
        }
        receipts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(receipts)
    }

    /// Writes a receipt, replacing any receipt with the same name.
    pub async fn save(&self, name: &str, contents: &[u8]) -> Result<Receipt, ReceiptError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, contents).await?;

        let metadata = tokio::fs::metadata(&path).await?;
        Ok(Receipt {
            name: name.to_string(),
            upload_date: metadata.modified()?.into(),
        })
    }

    /// Reads a receipt's contents.
    pub async fn open(&self, name: &str) -> Result<Vec<u8>, ReceiptError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ReceiptError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ReceiptError> {
        let unsafe_name = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '"'])
            || name.chars().any(char::is_control);
        if unsafe_name {
            return Err(ReceiptError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}
