//! Command parser - turns raw chat messages into leaderboard updates.
//!
//! A command looks like
//!
//! ```text
//! LB_UPDATE_MR: <@123> Duelist Diamond 2 2450 Master 1 2610 2026-02-14
//! ```
//!
//! Fields are separated by runs of whitespace. Rank names may span several
//! words, so the parser never relies on fixed token positions past the label.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{GameType, Shape};
use crate::rank::{is_numeric, recognize_rank, RankError, Rating};
use crate::state::{PlayerRecord, Standing};

/// Longest label kept after sanitizing.
pub const MAX_LABEL_CHARS: usize = 200;

const DISALLOWED: &[char] = &['<', '>', '\'', '"', '`', ';', '(', ')'];

/// A chat message as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Which rating a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankSlot {
    Current,
    Peak,
}

impl fmt::Display for RankSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("current"),
            Self::Peak => f.write_str("peak"),
        }
    }
}

/// Reasons a command could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing or malformed player mention")]
    InvalidMention,

    #[error("missing role or hero label")]
    MissingLabel,

    #[error("invalid {slot} rank: {source}")]
    InvalidRank {
        slot: RankSlot,
        #[source]
        source: RankError,
    },

    #[error("missing {slot} value")]
    MissingValue { slot: RankSlot },

    #[error("invalid {slot} value '{token}'")]
    InvalidValue { slot: RankSlot, token: String },

    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

/// A successfully parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpdate {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
    pub game: GameType,
    pub record: PlayerRecord,
}

/// A message that carried a command tag but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMessage {
    pub message_id: String,
    pub content: String,
    pub reason: ParseError,
}

/// Outcome of parsing a batch of messages.
#[derive(Debug, Default)]
pub struct ParseBatch {
    pub successful: Vec<ParsedUpdate>,
    pub failed: Vec<FailedMessage>,
    /// Messages that were not commands, or were for a filtered-out game
    pub skipped: usize,
}

impl ParseBatch {
    pub fn summary(&self) -> String {
        format!(
            "Parsed: {}, Failed: {}, Skipped: {}",
            self.successful.len(),
            self.failed.len(),
            self.skipped
        )
    }
}

/// Find the game whose tag appears earliest in `text`.
pub fn detect_game(text: &str) -> Option<(GameType, usize)> {
    GameType::ALL
        .into_iter()
        .filter_map(|game| text.find(game.spec().tag).map(|pos| (game, pos)))
        .min_by_key(|&(_, pos)| pos)
}

/// Parse one message.
///
/// Returns `Ok(None)` when the text carries no command tag.
pub fn parse_message(message: &RawMessage) -> Result<Option<ParsedUpdate>, ParseError> {
    let Some((game, pos)) = detect_game(&message.content) else {
        return Ok(None);
    };
    let body = &message.content[pos + game.spec().tag.len()..];
    let (user_id, standing, last_updated) = parse_fields(body, game)?;

    Ok(Some(ParsedUpdate {
        message_id: message.id.clone(),
        sent_at: message.timestamp,
        game,
        record: PlayerRecord {
            user_id,
            standing,
            last_updated,
        },
    }))
}

fn parse_fields(
    body: &str,
    game: GameType,
) -> Result<(String, Standing, DateTime<Utc>), ParseError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();

    let user_id = tokens
        .first()
        .and_then(|t| parse_mention(t))
        .ok_or(ParseError::InvalidMention)?;
    let label = tokens
        .get(1)
        .map(|t| sanitize_label(t))
        .ok_or(ParseError::MissingLabel)?;

    let mut rest = tokens.get(2..).unwrap_or_default();
    let current = take_rating(&mut rest, game, RankSlot::Current)?;
    let standing = match game.spec().shape {
        Shape::TwoRank => {
            let peak = take_rating(&mut rest, game, RankSlot::Peak)?;
            Standing::TwoRank {
                role: label,
                current,
                peak,
            }
        }
        Shape::SingleRank => Standing::SingleRank {
            hero_name: label,
            current,
        },
    };

    let date_text = rest.join(" ");
    let last_updated =
        parse_timestamp(&date_text).ok_or(ParseError::InvalidDate(date_text))?;

    Ok((user_id, standing, last_updated))
}

/// Consume a rank phrase, optional tier and value from the front of `rest`.
fn take_rating(rest: &mut &[&str], game: GameType, slot: RankSlot) -> Result<Rating, ParseError> {
    let tokens: &[&str] = *rest;
    let (rank, used) =
        recognize_rank(tokens, game).map_err(|source| ParseError::InvalidRank { slot, source })?;
    let tokens = &tokens[used..];

    let token = tokens.first().ok_or(ParseError::MissingValue { slot })?;
    if !is_numeric(token) {
        return Err(ParseError::InvalidValue {
            slot,
            token: token.to_string(),
        });
    }
    let value = token.parse::<u32>().map_err(|_| ParseError::InvalidValue {
        slot,
        token: token.to_string(),
    })?;
    *rest = &tokens[1..];

    Ok(Rating { rank, value })
}

/// Extract the numeric id from `<@123>` or `<@!123>`.
pub fn parse_mention(token: &str) -> Option<String> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    let id = inner.strip_prefix('!').unwrap_or(inner);
    is_numeric(id).then(|| id.to_string())
}

/// Strip disallowed characters, trim, and cap the length.
pub fn sanitize_label(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !DISALLOWED.contains(c)).collect();
    cleaned.trim().chars().take(MAX_LABEL_CHARS).collect()
}

/// Parse an ISO-8601 date or date-time into UTC.
///
/// Accepted forms: `YYYY-MM-DD` (midnight UTC), `YYYY-MM-DDTHH:MM[:SS[.f]]`
/// with `T` or a space as separator, optionally followed by `Z` or an
/// `±HH:MM` offset. A date-time without an offset is taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = text.strip_suffix('Z').unwrap_or(text);
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse a chronologically ordered batch of messages.
///
/// With a `filter`, commands for other games are counted as skipped.
pub fn parse_batch(messages: &[RawMessage], filter: Option<GameType>) -> ParseBatch {
    let mut batch = ParseBatch::default();

    for message in messages {
        if let Some(wanted) = filter {
            match detect_game(&message.content) {
                Some((game, _)) if game == wanted => {}
                _ => {
                    batch.skipped += 1;
                    continue;
                }
            }
        }

        match parse_message(message) {
            Ok(Some(update)) => {
                tracing::debug!(
                    message_id = %message.id,
                    game = %update.game,
                    user_id = %update.record.user_id,
                    "Parsed leaderboard update"
                );
                batch.successful.push(update);
            }
            Ok(None) => batch.skipped += 1,
            Err(reason) => {
                tracing::warn!(
                    message_id = %message.id,
                    reason = %reason,
                    "Skipping malformed leaderboard command"
                );
                batch.failed.push(FailedMessage {
                    message_id: message.id.clone(),
                    content: message.content.clone(),
                    reason,
                });
            }
        }
    }

    batch
}
