//! A single sync cycle for one game.

use serde::Serialize;

use crate::codec;
use crate::command::{parse_batch, FailedMessage, RawMessage};
use crate::game::GameType;
use crate::merge::apply;
use crate::state::LeaderboardState;

/// What a cycle did. Returned to the caller instead of kept in shared state.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub game: GameType,
    /// Messages handed to the cycle
    pub fetched: usize,
    /// Commands that parsed
    pub parsed: usize,
    pub applied: usize,
    pub stale: usize,
    pub mismatched: usize,
    /// Non-commands and commands for other games
    pub skipped: usize,
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<FailedMessage>,
    pub previous_cursor: Option<String>,
    pub cursor: Option<String>,
    /// Whether the snapshot needs publishing
    pub changed: bool,
}

impl CycleReport {
    pub fn summary(&self) -> String {
        format!(
            "Fetched: {}, Parsed: {}, Applied: {}, Stale: {}, Failed: {}, Skipped: {}",
            self.fetched,
            self.parsed,
            self.applied,
            self.stale,
            self.failures.len(),
            self.skipped
        )
    }
}

fn serialize_failures<S: serde::Serializer>(
    failures: &[FailedMessage],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(failures.len()))?;
    for failure in failures {
        seq.serialize_element(&serde_json::json!({
            "message_id": failure.message_id,
            "reason": failure.reason.to_string(),
        }))?;
    }
    seq.end()
}

/// Result of a cycle: the merged state, its encoded snapshot, and the report.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub state: LeaderboardState,
    pub blob: String,
    pub report: CycleReport,
}

/// Run one cycle on an already decoded state.
///
/// `messages` must be in send order. A state belonging to another game is
/// discarded and the board starts empty.
pub fn run_cycle(game: GameType, previous: LeaderboardState, messages: &[RawMessage]) -> SyncOutcome {
    let mut state = match previous.game {
        Some(g) if g != game => {
            tracing::warn!(
                game = %game,
                snapshot_game = %g,
                "Snapshot belongs to another game, starting an empty board"
            );
            LeaderboardState::new(game)
        }
        _ => previous,
    };
    let bootstrap = state.is_bootstrap();
    state.game = Some(game);
    let previous_cursor = state.cursor.clone();

    let batch = parse_batch(messages, Some(game));
    tracing::debug!(game = %game, summary = %batch.summary(), "Parsed messages");
    let parsed = batch.successful.len();
    let applied = apply(&mut state, batch.successful);

    let blob = codec::encode_state(&state, game);
    let report = CycleReport {
        game,
        fetched: messages.len(),
        parsed,
        applied: applied.applied,
        stale: applied.stale,
        mismatched: applied.mismatched,
        skipped: batch.skipped,
        failures: batch.failed,
        previous_cursor,
        cursor: state.cursor.clone(),
        changed: bootstrap || applied.applied > 0,
    };

    tracing::info!(game = %game, summary = %report.summary(), "Sync cycle complete");

    SyncOutcome {
        state,
        blob,
        report,
    }
}

/// Decode `previous_blob` (if any) and run a cycle on it.
pub fn sync_blob(game: GameType, previous_blob: Option<&str>, messages: &[RawMessage]) -> SyncOutcome {
    let previous = previous_blob.map(codec::decode).unwrap_or_default();
    run_cycle(game, previous, messages)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn msg(id: &str, content: &str) -> RawMessage {
        RawMessage {
            id: id.to_string(),
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_bootstrap_cycle_publishes_even_without_updates() {
        let outcome = sync_blob(GameType::Overwatch, None, &[]);
        assert!(outcome.report.changed);
        assert_eq!(outcome.blob, "[DATA:v1]\nGAME:overwatch\nLAST:none\n[/DATA]");
    }

    #[test]
    fn test_cycle_merges_and_advances_cursor() {
        let messages = vec![
            msg("100", "LB_UPDATE_DL: <@1> Haze Archon 4 1200 2026-02-14"),
            msg("101", "LB_UPDATE_DL: <@2> Vindicta Oracle 2 1500 2026-02-14"),
            msg("102", "LB_UPDATE_DL: <@3> Haze Archon 4 nope 2026-02-14"),
            msg("103", "LB_UPDATE_MR: <@4> Duelist Gold 1 900 Gold 1 900 2026-02-14"),
        ];

        let outcome = sync_blob(GameType::Deadlock, None, &messages);
        let report = &outcome.report;
        assert_eq!(report.fetched, 4);
        assert_eq!(report.applied, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.cursor.as_deref(), Some("101"));

        let ranked: Vec<&str> = outcome
            .state
            .ranked()
            .iter()
            .map(|p| p.user_id.as_str())
            .collect();
        assert_eq!(ranked, vec!["2", "1"]);
        assert!(outcome.blob.contains("LAST:101"));
    }

    #[test]
    fn test_nothing_applied_is_unchanged() {
        let first = sync_blob(
            GameType::Deadlock,
            None,
            &[msg("1", "LB_UPDATE_DL: <@1> Haze Archon 4 1200 2026-02-14")],
        );
        let second = sync_blob(GameType::Deadlock, Some(&first.blob), &[msg("2", "hello")]);

        assert!(!second.report.changed);
        assert_eq!(second.report.previous_cursor.as_deref(), Some("1"));
        assert_eq!(second.blob, first.blob);
    }

    #[test]
    fn test_foreign_snapshot_is_replaced() {
        let rivals = sync_blob(GameType::MarvelRivals, None, &[]);
        let outcome = sync_blob(GameType::Deadlock, Some(&rivals.blob), &[]);
        assert_eq!(outcome.state.game, Some(GameType::Deadlock));
        assert!(outcome.blob.contains("GAME:deadlock"));
    }

    #[test]
    fn test_report_serializes_failure_reasons() {
        let outcome = sync_blob(
            GameType::Deadlock,
            None,
            &[msg("7", "LB_UPDATE_DL: <@1> Haze Wizard 4 1200 2026-02-14")],
        );
        let json = serde_json::to_value(&outcome.report).unwrap();
        assert_eq!(json["failures"][0]["message_id"], "7");
        assert_eq!(
            json["failures"][0]["reason"],
            "invalid current rank: unknown rank 'Wizard'"
        );
    }
}
