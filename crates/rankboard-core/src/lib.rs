//! Rankboard Core - message-backed game leaderboards
//!
//! This crate parses leaderboard update commands posted in chat, merges them
//! into per-game boards, orders the boards, and round-trips each board through
//! a single text snapshot that can be embedded in a published message.

pub mod adapters;
pub mod codec;
pub mod command;
pub mod config;
pub mod game;
pub mod merge;
pub mod observability;
pub mod ordering;
pub mod rank;
pub mod state;
pub mod sync;

pub use command::{parse_batch, parse_message, ParseBatch, ParseError, ParsedUpdate, RawMessage};
pub use config::BoardConfig;
pub use game::GameType;
pub use rank::{Rank, Rating};
pub use state::{LeaderboardState, PlayerRecord, Standing};
pub use sync::{run_cycle, sync_blob, CycleReport, SyncOutcome, SyncRunner};
