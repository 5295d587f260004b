//! Runner - drives every configured game through its adapters.

use anyhow::{Context, Result};
use futures::future::join_all;

use super::cycle::{run_cycle, CycleReport};
use crate::adapters::{FileSnapshotStore, JsonlMessageSource, MessageSource, SnapshotStore};
use crate::codec;
use crate::config::BoardConfig;
use crate::game::GameType;

/// A game wired to where its messages come from and where its board goes.
pub struct GameBinding {
    pub game: GameType,
    pub source: Box<dyn MessageSource>,
    pub store: Box<dyn SnapshotStore>,
}

/// Outcome of one game's cycle.
#[derive(Debug)]
pub enum GameCycle {
    Completed(CycleReport),
    /// An adapter failed; the game's board was left untouched
    Failed { game: GameType, error: String },
}

impl GameCycle {
    pub fn game(&self) -> GameType {
        match self {
            Self::Completed(report) => report.game,
            Self::Failed { game, .. } => *game,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Runs sync cycles for a set of games.
pub struct SyncRunner {
    bindings: Vec<GameBinding>,
}

impl SyncRunner {
    pub fn new(bindings: Vec<GameBinding>) -> Self {
        Self { bindings }
    }

    /// File-backed bindings for the enabled games, optionally only `only`.
    ///
    /// Expects paths already resolved against the project root.
    pub fn from_config(config: &BoardConfig, only: Option<GameType>) -> Self {
        let bindings = config
            .enabled_games()
            .into_iter()
            .filter(|game| only.map_or(true, |o| o == *game))
            .map(|game| GameBinding {
                game,
                source: Box::new(JsonlMessageSource::new(config.messages_path(game))),
                store: Box::new(FileSnapshotStore::new(config.snapshot_path(game))),
            })
            .collect();
        Self::new(bindings)
    }

    pub fn games(&self) -> Vec<GameType> {
        self.bindings.iter().map(|b| b.game).collect()
    }

    /// Run every game concurrently. One game's adapter failure does not
    /// affect the others.
    pub async fn run_all(&self) -> Vec<GameCycle> {
        let cycles = self.bindings.iter().map(|binding| async move {
            match run_binding(binding).await {
                Ok(report) => GameCycle::Completed(report),
                Err(e) => {
                    let error = format!("{:#}", e);
                    tracing::error!(game = %binding.game, error = %error, "Sync cycle failed");
                    GameCycle::Failed {
                        game: binding.game,
                        error,
                    }
                }
            }
        });
        join_all(cycles).await
    }
}

async fn run_binding(binding: &GameBinding) -> Result<CycleReport> {
    let game = binding.game;
    tracing::info!(game = %game, "Starting sync cycle");

    let previous = binding
        .store
        .load()
        .await
        .with_context(|| format!("Failed to load {} snapshot", game))?;
    let state = previous.as_deref().map(codec::decode).unwrap_or_default();
    // A board for another game has no cursor worth resuming from
    let cursor = state
        .cursor
        .clone()
        .filter(|_| state.game == Some(game));

    let messages = binding
        .source
        .fetch_after(cursor.as_deref())
        .await
        .with_context(|| format!("Failed to fetch {} messages", game))?;

    let outcome = run_cycle(game, state, &messages);

    if outcome.report.changed {
        binding
            .store
            .publish(&outcome.blob)
            .await
            .with_context(|| format!("Failed to publish {} snapshot", game))?;
    } else {
        tracing::debug!(game = %game, "No changes, snapshot left as is");
    }

    Ok(outcome.report)
}
