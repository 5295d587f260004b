//! File-backed adapters - JSONL message logs and plain-text snapshots.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{MessageSource, SnapshotStore};
use crate::command::RawMessage;

/// Reads messages from a JSON-lines file, one [`RawMessage`] per line.
pub struct JsonlMessageSource {
    path: PathBuf,
}

impl JsonlMessageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageSource for JsonlMessageSource {
    async fn fetch_after(&self, cursor: Option<&str>) -> Result<Vec<RawMessage>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read messages from {}", self.path.display()))?;

        let mut messages = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message: RawMessage = serde_json::from_str(line).with_context(|| {
                format!("Failed to parse message on line {} of {}", index + 1, self.path.display())
            })?;
            messages.push(message);
        }

        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        if let Some(cursor) = cursor {
            match messages.iter().position(|m| m.id == cursor) {
                Some(pos) => {
                    messages.drain(..=pos);
                }
                None => {
                    tracing::debug!(cursor = %cursor, "Cursor not found in message log, reading all");
                }
            }
        }

        Ok(messages)
    }
}

/// Keeps a snapshot in a single text file.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read snapshot {}", self.path.display())),
        }
    }

    async fn publish(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write to a sibling temp file, then rename over the target
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, text)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to publish snapshot {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), bytes = text.len(), "Snapshot published");
        Ok(())
    }
}
