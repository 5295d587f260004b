//! Observability - sync events written as JSON lines.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::GameType;

/// One entry in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub timestamp: DateTime<Utc>,
    /// Shared by every event of one `sync` invocation
    pub cycle_id: Uuid,
    pub event_type: String,
    pub game: Option<GameType>,
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Appends events to the project's event log.
pub struct EventEmitter {
    events_path: PathBuf,
    cycle_id: Uuid,
}

impl EventEmitter {
    pub fn new(events_path: &Path) -> Self {
        Self {
            events_path: events_path.to_path_buf(),
            cycle_id: Uuid::new_v4(),
        }
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    /// Emit an event.
    pub fn emit(&self, event: SyncEvent) -> Result<()> {
        if let Some(parent) = self.events_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)?;

        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Emit an event for this cycle.
    pub fn emit_for(
        &self,
        event_type: &str,
        game: Option<GameType>,
        message: &str,
        metadata: serde_json::Value,
    ) -> Result<()> {
        self.emit(SyncEvent {
            timestamp: Utc::now(),
            cycle_id: self.cycle_id,
            event_type: event_type.to_string(),
            game,
            message: message.to_string(),
            metadata,
        })
    }

    /// Emit an event with no game or metadata.
    pub fn emit_simple(&self, event_type: &str, message: &str) -> Result<()> {
        self.emit_for(event_type, None, message, serde_json::Value::Null)
    }

    /// Read recent events, skipping lines that do not parse.
    pub fn read_recent(&self, limit: usize) -> Vec<SyncEvent> {
        let file = match std::fs::File::open(&self.events_path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut events: Vec<SyncEvent> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        // Return last N events
        if events.len() > limit {
            events.drain(0..events.len() - limit);
        }

        events
    }
}
