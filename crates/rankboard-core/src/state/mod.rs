//! Leaderboard state - player records and the per-game board.

mod board;
mod player;

pub use board::LeaderboardState;
pub use player::{PlayerRecord, Standing};
