//! ELO rating engine for the club ladder.
//!
//! Ratings start at 1000 and move by K = 32 times the difference between the
//! actual and expected score. Replay order matters: each match's expected
//! score depends on both players' ratings as of immediately before that
//! match, so the season recompute must process matches in strict
//! chronological order.

use crate::models::{RatingChange, RecordedMatch, UserId};
use std::collections::HashMap;

/// Starting rating for new players.
pub const INITIAL_RATING: i32 = 1000;

const K_FACTOR: f64 = 32.0;

/// Expected score for a player against an opponent.
fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10_f64.powf((opponent - rating) as f64 / 400.0))
}

/// New rating after one match. Actual score is 1 for a win, 0 for a loss.
pub fn new_rating(rating: i32, opponent: i32, won: bool) -> i32 {
    let actual = if won { 1.0 } else { 0.0 };
    (rating as f64 + K_FACTOR * (actual - expected_score(rating, opponent))).round() as i32
}

/// Rating movement for both sides of one match, player 1 first.
pub fn rate_match(rating1: i32, rating2: i32, player1_won: bool) -> (RatingChange, RatingChange) {
    let new1 = new_rating(rating1, rating2, player1_won);
    let new2 = new_rating(rating2, rating1, !player1_won);
    (
        RatingChange {
            old_rating: rating1,
            new_rating: new1,
            added_points: new1 - rating1,
        },
        RatingChange {
            old_rating: rating2,
            new_rating: new2,
            added_points: new2 - rating2,
        },
    )
}

/// A parsed "DD.MM.YYYY HH.MM.SS" timestamp, ordered chronologically.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Parse the persisted locale format: dot-separated date, space, dot-separated
/// time. Fails soft on anything malformed; callers exclude unparseable
/// timestamps from chronological ordering instead of crashing.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let (date, time) = raw.split_once(' ')?;
    let d: Vec<u32> = date.split('.').map(str::parse).collect::<Result<_, _>>().ok()?;
    let t: Vec<u32> = time.split('.').map(str::parse).collect::<Result<_, _>>().ok()?;
    if d.len() != 3 || t.len() != 3 {
        return None;
    }
    Some(Timestamp {
        year: d[2],
        month: d[1],
        day: d[0],
        hour: t[0],
        minute: t[1],
        second: t[2],
    })
}

/// Sort matches chronologically. Matches with malformed timestamps sort
/// after every parseable one, keeping their input order.
pub fn sort_chronologically(matches: &mut [RecordedMatch]) {
    matches.sort_by_key(|m| match parse_timestamp(&m.timestamp) {
        Some(ts) => (0, ts),
        None => (
            1,
            Timestamp {
                year: 0,
                month: 0,
                day: 0,
                hour: 0,
                minute: 0,
                second: 0,
            },
        ),
    });
}

/// Replay the full match history in chronological order, stamping the
/// rating movement on both sides of every match. Returns the final rating
/// per player. Matches are reordered in place.
pub fn replay_ratings(matches: &mut [RecordedMatch]) -> HashMap<UserId, i32> {
    sort_chronologically(matches);

    let mut ratings: HashMap<UserId, i32> = HashMap::new();
    for m in matches.iter_mut() {
        let r1 = *ratings.entry(m.player1.user_id).or_insert(INITIAL_RATING);
        let r2 = *ratings.entry(m.player2.user_id).or_insert(INITIAL_RATING);
        let player1_won = m.winner == m.player1.user_id;
        let (c1, c2) = rate_match(r1, r2, player1_won);
        ratings.insert(m.player1.user_id, c1.new_rating);
        ratings.insert(m.player2.user_id, c2.new_rating);
        m.rating_player1 = Some(c1);
        m.rating_player2 = Some(c2);
    }
    ratings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_score_equal_ratings() {
        assert!((expected_score(1000, 1000) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn equal_ratings_win_gains_16() {
        assert_eq!(new_rating(1000, 1000, true), 1016);
        assert_eq!(new_rating(1000, 1000, false), 984);
    }

    #[test]
    fn underdog_gains_more() {
        let gain = new_rating(900, 1300, true) - 900;
        assert!(gain > 16);
        let favourite_gain = new_rating(1300, 900, true) - 1300;
        assert!(favourite_gain < 16);
    }

    #[test]
    fn rate_match_deltas_mirror() {
        let (c1, c2) = rate_match(1000, 1000, true);
        assert_eq!(c1.added_points, 16);
        assert_eq!(c2.added_points, -16);
        assert_eq!(c1.new_rating, 1016);
        assert_eq!(c2.new_rating, 984);
    }

    #[test]
    fn parses_locale_timestamp() {
        let ts = parse_timestamp("07.03.2025 18.45.09").unwrap();
        assert_eq!((ts.year, ts.month, ts.day), (2025, 3, 7));
        assert_eq!((ts.hour, ts.minute, ts.second), (18, 45, 9));
    }

    #[test]
    fn malformed_timestamps_fail_soft() {
        assert!(parse_timestamp("07.03.2025").is_none());
        assert!(parse_timestamp("07.03.2025 18:45:09").is_none());
        assert!(parse_timestamp("seven.03.2025 18.45.09").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn timestamps_order_chronologically() {
        let early = parse_timestamp("31.12.2024 23.59.59").unwrap();
        let late = parse_timestamp("01.01.2025 00.00.00").unwrap();
        assert!(early < late);
    }
}
