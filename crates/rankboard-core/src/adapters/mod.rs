//! Adapters - where messages come from and where snapshots go.
//!
//! The core never talks to a chat service itself. A sync cycle reads new
//! messages through a [`MessageSource`] and loads and publishes the snapshot
//! through a [`SnapshotStore`].

mod files;

use anyhow::Result;
use async_trait::async_trait;

use crate::command::RawMessage;

pub use files::{FileSnapshotStore, JsonlMessageSource};

/// Supplies chat messages in send order.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages sent after `cursor`, oldest first. `None` means from the start.
    async fn fetch_after(&self, cursor: Option<&str>) -> Result<Vec<RawMessage>>;
}

/// Holds the published snapshot text for one game.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Currently published text, or `None` when nothing was published yet
    async fn load(&self) -> Result<Option<String>>;

    /// Replace the published text
    async fn publish(&self, text: &str) -> Result<()>;
}
