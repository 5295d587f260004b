//! Sync - one decode, parse, merge, sort, encode pass per game.

mod cycle;
mod runner;

pub use cycle::{run_cycle, sync_blob, CycleReport, SyncOutcome};
pub use runner::{GameBinding, GameCycle, SyncRunner};
