//! Player record - one participant's standing on a board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{GameType, Shape};
use crate::rank::Rating;

/// A single player's entry on a game's leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Numeric chat user id, unique within a board
    pub user_id: String,

    /// Ratings and label, shaped by the game
    pub standing: Standing,

    /// Send time of the update that produced this record
    pub last_updated: DateTime<Utc>,
}

/// Game-shaped part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Standing {
    TwoRank {
        role: String,
        current: Rating,
        peak: Rating,
    },
    SingleRank {
        hero_name: String,
        current: Rating,
    },
}

impl Standing {
    pub fn shape(&self) -> Shape {
        match self {
            Self::TwoRank { .. } => Shape::TwoRank,
            Self::SingleRank { .. } => Shape::SingleRank,
        }
    }

    pub fn current(&self) -> &Rating {
        match self {
            Self::TwoRank { current, .. } | Self::SingleRank { current, .. } => current,
        }
    }

    pub fn peak(&self) -> Option<&Rating> {
        match self {
            Self::TwoRank { peak, .. } => Some(peak),
            Self::SingleRank { .. } => None,
        }
    }

    /// Role or hero name
    pub fn label(&self) -> &str {
        match self {
            Self::TwoRank { role, .. } => role,
            Self::SingleRank { hero_name, .. } => hero_name,
        }
    }
}

impl PlayerRecord {
    pub fn current(&self) -> &Rating {
        self.standing.current()
    }

    pub fn peak(&self) -> Option<&Rating> {
        self.standing.peak()
    }

    /// Check the record's shape matches what the game stores.
    pub fn fits(&self, game: GameType) -> bool {
        self.standing.shape() == game.spec().shape
    }
}
