//! Merge engine - folds parsed updates into a board.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::command::ParsedUpdate;
use crate::state::{LeaderboardState, PlayerRecord};

/// Result of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Inserted, or replaced an older or equally old record
    Applied,
    /// Older than the stored record; discarded
    Stale,
}

/// Totals from applying a batch of updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub stale: usize,
    /// Updates for a different game than the board's
    pub mismatched: usize,
    /// Id of the last applied update message, if any was applied
    pub last_applied: Option<String>,
}

/// Insert `incoming`, or replace the stored record unless `incoming` is
/// strictly older. Equal timestamps replace.
pub fn upsert(players: &mut BTreeMap<String, PlayerRecord>, incoming: PlayerRecord) -> UpsertOutcome {
    match players.entry(incoming.user_id.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(incoming);
            UpsertOutcome::Applied
        }
        Entry::Occupied(mut slot) => {
            if incoming.last_updated < slot.get().last_updated {
                UpsertOutcome::Stale
            } else {
                slot.insert(incoming);
                UpsertOutcome::Applied
            }
        }
    }
}

/// Apply chronologically ordered updates to `state`.
///
/// The cursor moves to the message id of the last applied update. Stale and
/// mismatched updates leave it where it was. A bootstrap state takes the game
/// of the first update.
pub fn apply<I>(state: &mut LeaderboardState, updates: I) -> ApplyReport
where
    I: IntoIterator<Item = ParsedUpdate>,
{
    let mut report = ApplyReport::default();

    for update in updates {
        let game = *state.game.get_or_insert(update.game);
        if update.game != game || !update.record.fits(game) {
            tracing::warn!(
                message_id = %update.message_id,
                board = %game,
                update_game = %update.game,
                "Ignoring update for a different game"
            );
            report.mismatched += 1;
            continue;
        }

        match upsert(&mut state.players, update.record) {
            UpsertOutcome::Applied => {
                report.applied += 1;
                report.last_applied = Some(update.message_id.clone());
                state.cursor = Some(update.message_id);
            }
            UpsertOutcome::Stale => {
                tracing::debug!(message_id = %update.message_id, "Discarding stale update");
                report.stale += 1;
            }
        }
    }

    report
}
