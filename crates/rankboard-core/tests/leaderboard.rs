use chrono::{DateTime, Duration, TimeZone, Utc};
use rankboard_core::{
    codec,
    merge::{upsert, UpsertOutcome},
    rank::{recognize_rank, RankError},
    sync_blob, GameType, LeaderboardState, PlayerRecord, Rank, RawMessage, Rating, Standing,
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, hour, 0, 0).unwrap()
}

fn msg(id: &str, day: u32, content: &str) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: at(day, 12),
    }
}

fn rating(name: &str, tier: u8, value: u32, game: GameType) -> Rating {
    Rating {
        rank: Rank::new(name, tier, game),
        value,
    }
}

fn sample_players(game: GameType) -> Vec<PlayerRecord> {
    let names = game.spec().ranks;
    (0..6u32)
        .map(|i| {
            let current = rating(names[i as usize % names.len()], (i % 3 + 1) as u8, 1000 + i * 37, game);
            let standing = if game.is_two_rank() {
                Standing::TwoRank {
                    role: format!("Role {}", i),
                    current,
                    peak: rating(names[names.len() - 1], 1, 5000 + i, game),
                }
            } else {
                Standing::SingleRank {
                    hero_name: format!("Hero {}", i),
                    current,
                }
            };
            PlayerRecord {
                user_id: format!("{}", 1000 + i),
                standing,
                last_updated: at(1 + i, i),
            }
        })
        .collect()
}

#[test]
fn snapshot_roundtrip_preserves_players_cursor_and_game() {
    for game in GameType::ALL {
        let players = sample_players(game);
        // Encode in reverse to show decode does not depend on order
        let blob = codec::encode(players.iter().rev(), Some("424242"), game);
        let state = codec::decode(&blob);

        assert_eq!(state.game, Some(game));
        assert_eq!(state.cursor.as_deref(), Some("424242"));
        assert_eq!(state.len(), players.len());
        for player in &players {
            assert_eq!(state.get(&player.user_id), Some(player), "{} {}", game, player.user_id);
        }
    }
}

#[test]
fn rank_recognition_examples() {
    let game = GameType::MarvelRivals;
    let one_above_all: Vec<&str> = "One Above All 1".split_whitespace().collect();
    let (rank, _) = recognize_rank(&one_above_all, game).unwrap();
    assert_eq!((rank.name.as_str(), rank.tier), ("One Above All", 1));

    let (rank, _) = recognize_rank(&["Diamond", "2"], game).unwrap();
    assert_eq!((rank.name.as_str(), rank.tier), ("Diamond", 2));

    assert_eq!(
        recognize_rank(&["Nonsense", "1"], game).unwrap_err(),
        RankError::UnknownRank("Nonsense".to_string())
    );
}

#[test]
fn stale_updates_are_rejected_and_ties_replace() {
    let game = GameType::Overwatch;
    let t = at(14, 10);
    let record = |value: u32, when: DateTime<Utc>| PlayerRecord {
        user_id: "1".to_string(),
        standing: Standing::TwoRank {
            role: "Tank".to_string(),
            current: rating("Gold", 2, value, game),
            peak: rating("Gold", 1, value, game),
        },
        last_updated: when,
    };

    let mut state = LeaderboardState::new(game);
    upsert(&mut state.players, record(1800, t));

    assert_eq!(
        upsert(&mut state.players, record(1700, t - Duration::seconds(1))),
        UpsertOutcome::Stale
    );
    assert_eq!(state.get("1").unwrap().current().value, 1800);

    assert_eq!(upsert(&mut state.players, record(1900, t)), UpsertOutcome::Applied);
    assert_eq!(state.get("1").unwrap().current().value, 1900);
}

#[test]
fn out_of_order_updates_keep_the_newest_record() {
    let messages = vec![
        msg("1", 10, "LB_UPDATE_OW: <@7> Support Gold 2 1800 Gold 1 1900 2026-02-10"),
        msg("2", 11, "LB_UPDATE_OW: <@7> Support Platinum 4 2050 Platinum 4 2050 2026-02-12"),
        // Posted later, but describes an earlier date
        msg("3", 12, "LB_UPDATE_OW: <@7> Support Gold 3 1750 Gold 1 1900 2026-02-11"),
    ];

    let outcome = sync_blob(GameType::Overwatch, None, &messages);
    assert_eq!(outcome.report.applied, 2);
    assert_eq!(outcome.report.stale, 1);
    assert_eq!(outcome.report.cursor.as_deref(), Some("2"));
    assert_eq!(outcome.state.get("7").unwrap().current().rank.name, "Platinum");
}

#[test]
fn full_board_ordering() {
    let messages = vec![
        msg("1", 14, "LB_UPDATE_MR: <@1> Duelist Platinum 1 2100 Diamond 3 2300 2026-02-14"),
        msg("2", 14, "LB_UPDATE_MR: <@2> Vanguard Diamond 2 2450 Diamond 2 2450 2026-02-14"),
        msg("3", 14, "LB_UPDATE_MR: <@3> Strategist Diamond 2 2300 Master 1 2610 2026-02-14"),
        msg("4", 14, "LB_UPDATE_MR: <@4> Duelist One Above All 1 5100 One Above All 1 5200 2026-02-14"),
    ];

    let outcome = sync_blob(GameType::MarvelRivals, None, &messages);
    let order: Vec<&str> = outcome
        .state
        .ranked()
        .iter()
        .map(|p| p.user_id.as_str())
        .collect();
    assert_eq!(order, vec!["4", "3", "2", "1"]);

    // The encoded snapshot lists players in the same order
    let lines: Vec<&str> = outcome.blob.lines().skip(3).take(4).collect();
    let encoded_order: Vec<&str> = lines.iter().map(|l| l.split('|').next().unwrap()).collect();
    assert_eq!(encoded_order, order);
}

#[test]
fn resync_with_same_messages_is_stable() {
    let messages = vec![
        msg("1", 14, "LB_UPDATE_DL: <@1> Haze Archon 4 1200 2026-02-14"),
        msg("2", 14, "LB_UPDATE_DL: <@2> Paradox Archon 4 1100 2026-02-14"),
    ];

    let first = sync_blob(GameType::Deadlock, None, &messages);
    let again = sync_blob(GameType::Deadlock, Some(&first.blob), &messages);

    assert_eq!(again.state, first.state);
    assert_eq!(again.blob, first.blob);
}

#[test]
fn bootstrap_decode_has_no_state() {
    for text in ["", "random unrelated text"] {
        let state = codec::decode(text);
        assert_eq!(state.game, None);
        assert_eq!(state.cursor, None);
        assert!(state.players.is_empty());
    }
}

#[test]
fn stored_timestamps_keep_their_precision_across_cycles() {
    let first = vec![msg(
        "1",
        14,
        "LB_UPDATE_DL: <@1> Haze Oracle 2 1400 2026-02-14T20:15:00.123456Z",
    )];
    let stored = sync_blob(GameType::Deadlock, None, &first);
    assert!(stored.blob.contains("2026-02-14T20:15:00.123456Z"));
    assert_eq!(codec::decode(&stored.blob).players, stored.state.players);

    // Earlier than the stored value, but equal to it once cut to milliseconds
    let older = vec![msg(
        "2",
        14,
        "LB_UPDATE_DL: <@1> Haze Archon 1 900 2026-02-14T20:15:00.123100Z",
    )];
    let again = sync_blob(GameType::Deadlock, Some(&stored.blob), &older);
    assert_eq!(again.report.stale, 1);
    assert_eq!(again.report.applied, 0);
    assert_eq!(again.state.get("1").unwrap().current().value, 1400);
}
