//! Snapshot codec - the whole board as one block of text.
//!
//! ```text
//! [DATA:v1]
//! GAME:marvel_rivals
//! LAST:1337
//! 123|Diamond 2|2450|Master 1|2610|Duelist|2026-02-14T00:00:00Z
//! [/DATA]
//! ```
//!
//! Fields are joined with `|` and are not escaped, so a label containing `|`
//! or a newline does not survive a round trip.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::game::{GameType, Shape};
use crate::rank::{recognize_rank, Rank, Rating};
use crate::state::{LeaderboardState, PlayerRecord, Standing};

pub const START_MARKER: &str = "[DATA:v1]";
pub const END_MARKER: &str = "[/DATA]";

const GAME_PREFIX: &str = "GAME:";
const LAST_PREFIX: &str = "LAST:";
const NO_CURSOR: &str = "none";

/// Why a persisted player line was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("expected {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("bad rank field '{0}'")]
    BadRank(String),

    #[error("bad value field '{0}'")]
    BadValue(String),

    #[error("bad timestamp '{0}'")]
    BadTimestamp(String),
}

/// Canonical storage form of a timestamp. Keeps whatever fraction of a
/// second the timestamp carries.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Encode players in the given order. Sorting is the caller's job.
///
/// Records whose shape does not match `game` are skipped with a warning.
pub fn encode<'a, I>(players: I, cursor: Option<&str>, game: GameType) -> String
where
    I: IntoIterator<Item = &'a PlayerRecord>,
{
    let mut lines = vec![
        START_MARKER.to_string(),
        format!("{}{}", GAME_PREFIX, game.name()),
        format!("{}{}", LAST_PREFIX, cursor.unwrap_or(NO_CURSOR)),
    ];
    lines.extend(
        players
            .into_iter()
            .filter(|player| {
                let fits = player.fits(game);
                if !fits {
                    tracing::warn!(game = %game, user_id = %player.user_id, "Skipping record shaped for another game");
                }
                fits
            })
            .map(encode_player),
    );
    lines.push(END_MARKER.to_string());
    lines.join("\n")
}

/// Encode a state with its players in leaderboard order.
pub fn encode_state(state: &LeaderboardState, game: GameType) -> String {
    let ranked = crate::ordering::sort_players(state.players.values(), game);
    encode(ranked, state.cursor.as_deref(), game)
}

fn encode_player(player: &PlayerRecord) -> String {
    let updated = format_timestamp(&player.last_updated);
    match &player.standing {
        Standing::TwoRank {
            role,
            current,
            peak,
        } => [
            player.user_id.clone(),
            current.rank.to_string(),
            current.value.to_string(),
            peak.rank.to_string(),
            peak.value.to_string(),
            role.clone(),
            updated,
        ]
        .join("|"),
        Standing::SingleRank { hero_name, current } => [
            player.user_id.clone(),
            current.rank.to_string(),
            current.value.to_string(),
            hero_name.clone(),
            updated,
        ]
        .join("|"),
    }
}

/// Decode a snapshot, tolerating surrounding text.
///
/// Missing markers or an unknown game give the empty bootstrap state.
/// Malformed player lines are dropped with a warning.
pub fn decode(blob: &str) -> LeaderboardState {
    let Some(start) = blob.find(START_MARKER) else {
        return LeaderboardState::default();
    };
    let body_start = start + START_MARKER.len();
    let Some(len) = blob[body_start..].find(END_MARKER) else {
        return LeaderboardState::default();
    };
    let body = &blob[body_start..body_start + len];

    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());

    let game_name = lines
        .next()
        .and_then(|l| l.strip_prefix(GAME_PREFIX))
        .map(str::trim)
        .unwrap_or_default();
    let Some(game) = GameType::from_name(game_name) else {
        tracing::warn!(game = %game_name, "Snapshot names an unknown game, starting empty");
        return LeaderboardState::default();
    };

    let cursor = lines
        .next()
        .and_then(|l| l.strip_prefix(LAST_PREFIX))
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != NO_CURSOR)
        .map(str::to_string);

    let mut state = LeaderboardState {
        game: Some(game),
        cursor,
        ..LeaderboardState::default()
    };

    for line in lines {
        match decode_player(line, game) {
            Ok(player) => {
                state.players.insert(player.user_id.clone(), player);
            }
            Err(err) => {
                tracing::warn!(game = %game, line = %line, error = %err, "Dropping malformed snapshot line");
            }
        }
    }

    state
}

/// Decode one player line for `game`.
pub fn decode_player(line: &str, game: GameType) -> Result<PlayerRecord, MalformedLine> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let expected = game.spec().columns();
    if fields.len() < expected {
        return Err(MalformedLine::TooFewFields {
            expected,
            found: fields.len(),
        });
    }

    let current = decode_rating(fields[1], fields[2], game)?;
    let (standing, updated) = match game.spec().shape {
        Shape::TwoRank => (
            Standing::TwoRank {
                current,
                peak: decode_rating(fields[3], fields[4], game)?,
                role: fields[5].to_string(),
            },
            fields[6],
        ),
        Shape::SingleRank => (
            Standing::SingleRank {
                current,
                hero_name: fields[3].to_string(),
            },
            fields[4],
        ),
    };

    let last_updated = DateTime::parse_from_rfc3339(updated)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MalformedLine::BadTimestamp(updated.to_string()))?;

    Ok(PlayerRecord {
        user_id: fields[0].to_string(),
        standing,
        last_updated,
    })
}

fn decode_rating(rank: &str, value: &str, game: GameType) -> Result<Rating, MalformedLine> {
    Ok(Rating {
        rank: decode_rank(rank, game)?,
        value: value
            .parse()
            .map_err(|_| MalformedLine::BadValue(value.to_string()))?,
    })
}

/// A rank field is `"<name> <tier>"` where the name may contain spaces.
fn decode_rank(field: &str, game: GameType) -> Result<Rank, MalformedLine> {
    let tokens: Vec<&str> = field.split_whitespace().collect();
    let bad = || MalformedLine::BadRank(field.to_string());

    let (name_tokens, tier) = match tokens.split_last() {
        Some((last, name)) if !name.is_empty() => (name, *last),
        _ => return Err(bad()),
    };
    let tier: u8 = tier.parse().map_err(|_| bad())?;
    let (rank, used) = recognize_rank(name_tokens, game).map_err(|_| bad())?;
    if used != name_tokens.len() {
        return Err(bad());
    }
    Ok(Rank::new(rank.name, tier, game))
}

/// Place a blob under a human-readable body so the published message can
/// still be decoded.
pub fn embed(body: &str, blob: &str) -> String {
    let body = body.trim_end();
    if body.is_empty() {
        blob.to_string()
    } else {
        format!("{}\n\n{}", body, blob)
    }
}
