//! Board configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::game::GameType;

/// Project configuration, loaded from .rankboard/config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Config version
    pub version: Option<String>,

    /// Data directory for message logs and snapshots (relative to project root)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSONL event log written by sync cycles
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,

    /// Per-game sources, keyed by persisted game name
    #[serde(default = "default_games")]
    pub games: BTreeMap<GameType, GameConfig>,
}

/// Where one game's messages and snapshot live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSONL message log; defaults to `<data_dir>/<game>.messages.jsonl`
    #[serde(default)]
    pub messages: Option<PathBuf>,

    /// Snapshot file; defaults to `<data_dir>/<game>.board.txt`
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            messages: None,
            snapshot: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".rankboard/data")
}
fn default_events_path() -> PathBuf {
    PathBuf::from(".rankboard/events.jsonl")
}
fn default_games() -> BTreeMap<GameType, GameConfig> {
    GameType::ALL
        .into_iter()
        .map(|game| (game, GameConfig::default()))
        .collect()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: None,
            data_dir: default_data_dir(),
            events_path: default_events_path(),
            games: default_games(),
        }
    }
}

impl BoardConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .rankboard/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".rankboard/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.data_dir = project_root.join(&self.data_dir);
        self.events_path = project_root.join(&self.events_path);
        let data_dir = self.data_dir.clone();
        for (game, cfg) in self.games.iter_mut() {
            cfg.messages = Some(match cfg.messages.take() {
                Some(p) => project_root.join(p),
                None => data_dir.join(format!("{}.messages.jsonl", game.name())),
            });
            cfg.snapshot = Some(match cfg.snapshot.take() {
                Some(p) => project_root.join(p),
                None => data_dir.join(format!("{}.board.txt", game.name())),
            });
        }
    }

    /// Games with `enabled: true`, in a stable order
    pub fn enabled_games(&self) -> Vec<GameType> {
        self.games
            .iter()
            .filter(|(_, cfg)| cfg.enabled)
            .map(|(game, _)| *game)
            .collect()
    }

    /// Resolved message log path for a game
    pub fn messages_path(&self, game: GameType) -> PathBuf {
        self.games
            .get(&game)
            .and_then(|cfg| cfg.messages.clone())
            .unwrap_or_else(|| self.data_dir.join(format!("{}.messages.jsonl", game.name())))
    }

    /// Resolved snapshot path for a game
    pub fn snapshot_path(&self, game: GameType) -> PathBuf {
        self.games
            .get(&game)
            .and_then(|cfg| cfg.snapshot.clone())
            .unwrap_or_else(|| self.data_dir.join(format!("{}.board.txt", game.name())))
    }
}
