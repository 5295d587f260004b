//! Leaderboard ordering.

use std::cmp::Ordering;

use crate::game::GameType;
use crate::rank::sort_key;
use crate::state::PlayerRecord;

/// Compare two players, best first.
///
/// Keys in priority order: current rank (higher first), current value (lower
/// first), then for two-rank games peak rank (higher first) and peak value
/// (lower first), and finally the most recently updated player first.
pub fn compare(a: &PlayerRecord, b: &PlayerRecord, game: GameType) -> Ordering {
    let (ca, cb) = (a.current(), b.current());
    let mut ord = sort_key(&cb.rank, game)
        .cmp(&sort_key(&ca.rank, game))
        .then_with(|| ca.value.cmp(&cb.value));

    if game.is_two_rank() {
        if let (Some(pa), Some(pb)) = (a.peak(), b.peak()) {
            ord = ord
                .then_with(|| sort_key(&pb.rank, game).cmp(&sort_key(&pa.rank, game)))
                .then_with(|| pa.value.cmp(&pb.value));
        }
    }

    ord.then_with(|| b.last_updated.cmp(&a.last_updated))
}

/// Sort players into leaderboard order. The sort is stable.
pub fn sort_players<'a, I>(players: I, game: GameType) -> Vec<&'a PlayerRecord>
where
    I: IntoIterator<Item = &'a PlayerRecord>,
{
    let mut sorted: Vec<&PlayerRecord> = players.into_iter().collect();
    sorted.sort_by(|a, b| compare(a, b, game));
    sorted
}
