//! Rank recognition and ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::GameType;

/// A named rank and the tier within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rank {
    /// Canonical spelling from the game's rank table
    pub name: String,
    pub tier: u8,
}

/// A rank together with its ladder points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rank: Rank,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("no rank given")]
    Missing,

    #[error("unknown rank '{0}'")]
    UnknownRank(String),
}

impl Rank {
    /// Build a rank, clamping an out-of-range tier to 1.
    pub fn new(name: impl Into<String>, tier: u8, game: GameType) -> Self {
        let max = game.spec().max_tier;
        let tier = if (1..=max).contains(&tier) { tier } else { 1 };
        Self {
            name: name.into(),
            tier,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.tier)
    }
}

pub(crate) fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Look up a rank name in the game's table, ignoring case.
pub fn canonical_name(phrase: &str, game: GameType) -> Option<&'static str> {
    game.spec()
        .ranks
        .iter()
        .copied()
        .find(|name| name.eq_ignore_ascii_case(phrase))
}

/// Recognize a rank at the start of `tokens`.
///
/// The leading run of non-numeric tokens is the candidate phrase; its
/// prefixes are tried longest first so multi-word names like
/// "One Above All" win over shorter matches. A numeric token directly after
/// the matched phrase is taken as the tier. Returns the rank and the number
/// of tokens consumed.
pub fn recognize_rank<S: AsRef<str>>(
    tokens: &[S],
    game: GameType,
) -> Result<(Rank, usize), RankError> {
    let phrase_len = tokens
        .iter()
        .take_while(|t| !is_numeric(t.as_ref()))
        .count();
    if phrase_len == 0 {
        return Err(RankError::Missing);
    }

    for len in (1..=phrase_len).rev() {
        let phrase = tokens[..len]
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        let Some(name) = canonical_name(&phrase, game) else {
            continue;
        };

        return Ok(match tokens.get(len).map(|t| t.as_ref()) {
            Some(next) if is_numeric(next) => {
                let tier = next.parse::<u8>().unwrap_or(0);
                (Rank::new(name, tier, game), len + 1)
            }
            _ => (Rank::new(name, 1, game), len),
        });
    }

    let phrase = tokens[..phrase_len]
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    Err(RankError::UnknownRank(phrase))
}

/// Total-order key for a rank; larger is better.
///
/// `index * max_tier + (max_tier - tier + 1)`. A name missing from the table
/// yields `0`, below every valid key.
pub fn sort_key(rank: &Rank, game: GameType) -> u32 {
    let spec = game.spec();
    let Some(index) = spec
        .ranks
        .iter()
        .position(|name| name.eq_ignore_ascii_case(&rank.name))
    else {
        return 0;
    };
    let max = u32::from(spec.max_tier);
    let tier = u32::from(rank.tier).clamp(1, max);
    index as u32 * max + (max - tier + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_multi_word_rank() {
        let (rank, used) =
            recognize_rank(&tokens("One Above All 1"), GameType::MarvelRivals).unwrap();
        assert_eq!(rank.name, "One Above All");
        assert_eq!(rank.tier, 1);
        assert_eq!(used, 4);
    }

    #[test]
    fn test_single_word_rank_with_tier() {
        let (rank, used) = recognize_rank(&tokens("Diamond 2"), GameType::MarvelRivals).unwrap();
        assert_eq!(rank, Rank::new("Diamond", 2, GameType::MarvelRivals));
        assert_eq!(used, 2);
    }

    #[test]
    fn test_unknown_rank() {
        let err = recognize_rank(&tokens("Nonsense 1"), GameType::MarvelRivals).unwrap_err();
        assert_eq!(err, RankError::UnknownRank("Nonsense".to_string()));
    }

    #[test]
    fn test_case_insensitive_and_canonicalized() {
        let (rank, _) = recognize_rank(&tokens("one above ALL 2"), GameType::MarvelRivals).unwrap();
        assert_eq!(rank.name, "One Above All");
        assert_eq!(rank.tier, 2);
    }

    #[test]
    fn test_missing_tier_defaults_to_one() {
        let (rank, used) = recognize_rank(&tokens("Grandmaster"), GameType::Overwatch).unwrap();
        assert_eq!(rank.tier, 1);
        assert_eq!(used, 1);
    }

    #[test]
    fn test_out_of_range_tier_defaults_to_one() {
        let (rank, used) = recognize_rank(&tokens("Gold 9 1500"), GameType::MarvelRivals).unwrap();
        assert_eq!(rank.tier, 1);
        assert_eq!(used, 2);

        let (rank, _) = recognize_rank(&tokens("Gold 0"), GameType::Overwatch).unwrap();
        assert_eq!(rank.tier, 1);
    }

    #[test]
    fn test_longest_prefix_leaves_trailing_words() {
        // Only "Master" matches; "Extra" is left for the caller.
        let (rank, used) = recognize_rank(&tokens("Master Extra"), GameType::Overwatch).unwrap();
        assert_eq!(rank.name, "Master");
        assert_eq!(used, 1);
    }

    #[test]
    fn test_empty_phrase() {
        let empty: [&str; 0] = [];
        assert_eq!(
            recognize_rank(&empty, GameType::Deadlock).unwrap_err(),
            RankError::Missing
        );
        assert_eq!(
            recognize_rank(&tokens("3 1200"), GameType::Deadlock).unwrap_err(),
            RankError::Missing
        );
    }

    #[test]
    fn test_sort_key_formula() {
        let game = GameType::MarvelRivals;
        // Bronze is index 0: tier 3 -> 1, tier 1 -> 3
        assert_eq!(sort_key(&Rank::new("Bronze", 3, game), game), 1);
        assert_eq!(sort_key(&Rank::new("Bronze", 1, game), game), 3);
        // Diamond is index 4
        assert_eq!(sort_key(&Rank::new("Diamond", 2, game), game), 4 * 3 + 2);
        assert!(
            sort_key(&Rank::new("Diamond", 3, game), game)
                > sort_key(&Rank::new("Platinum", 1, game), game)
        );
    }

    #[test]
    fn test_sort_key_unknown_is_worst() {
        let game = GameType::Overwatch;
        let bogus = Rank {
            name: "Wood".to_string(),
            tier: 1,
        };
        assert_eq!(sort_key(&bogus, game), 0);
        assert!(sort_key(&Rank::new("Bronze", 5, game), game) > 0);
    }
}
