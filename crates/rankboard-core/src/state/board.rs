//! Leaderboard state for one game.

use std::collections::BTreeMap;

use crate::game::GameType;
use crate::ordering;

use super::player::PlayerRecord;

/// Decoded state of one game's snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardState {
    /// Owning game; absent for a board that was never published
    pub game: Option<GameType>,

    /// Id of the last applied update message
    pub cursor: Option<String>,

    /// Players keyed by user id
    pub players: BTreeMap<String, PlayerRecord>,
}

impl LeaderboardState {
    /// Empty state for a known game
    pub fn new(game: GameType) -> Self {
        Self {
            game: Some(game),
            ..Self::default()
        }
    }

    /// True for the uninitialized state returned when no snapshot exists
    pub fn is_bootstrap(&self) -> bool {
        self.game.is_none() && self.cursor.is_none() && self.players.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&PlayerRecord> {
        self.players.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in leaderboard order, best first.
    ///
    /// A bootstrap state has no game and therefore no players to rank.
    pub fn ranked(&self) -> Vec<&PlayerRecord> {
        match self.game {
            Some(game) => ordering::sort_players(self.players.values(), game),
            None => Vec::new(),
        }
    }
}
