// src/core/fs_ops.rs
//! File system helpers shared by the store and the browser snapshots

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Replace the file's contents in one step.
    ///
    /// Writes a sibling temp file then renames it over the target, so a
    /// crash mid-write leaves the previous contents intact.
    pub async fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let tmp_path = Self::temp_sibling(path);
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).await.with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        debug!("Written file: {}", path.display());
        Ok(())
    }

    /// Load a JSON document, yielding the default value when the file is
    /// missing or unreadable.
    pub async fn read_json_or_default<T>(path: &Path) -> T
    where
        T: DeserializeOwned + Default,
    {
        if !path.exists() {
            return T::default();
        }

        let content = match Self::read_file_safe(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("{:#}; starting from empty state", e);
                return T::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Failed to parse {}: {}; starting from empty state",
                    path.display(),
                    e
                );
                T::default()
            }
        }
    }

    pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        Self::write_file_atomic(path, &content).await
    }

    /// File name with a UTC timestamp, e.g. `snapshot_20250101_120000.html`
    pub fn timestamped_name(stem: &str, extension: &str) -> String {
        format!(
            "{}_{}.{}",
            stem,
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            extension
        )
    }

    fn temp_sibling(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");
        path.with_file_name(format!(".{}.tmp", file_name))
    }
}
