//! Round-robin match generation: every participant plays every other once.

use crate::models::{MatchRecord, PlayerRef};
use rand::seq::SliceRandom;

/// Generate the C(N,2) all-play-all matches for `players`.
///
/// One match per unordered pair, scores 0/0, not started. The pairing set is
/// deterministic; only the presentation order is shuffled so the displayed
/// schedule carries no bias. Caller guarantees N >= 2.
pub fn round_robin_matches(players: &[PlayerRef]) -> Vec<MatchRecord> {
    let mut matches = Vec::with_capacity(players.len() * (players.len().saturating_sub(1)) / 2);
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            matches.push(MatchRecord::pairing(players[i].clone(), players[j].clone()));
        }
    }
    matches.shuffle(&mut rand::thread_rng());
    matches
}
