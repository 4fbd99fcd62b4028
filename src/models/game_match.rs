//! Match records: bracket matches (possibly unseeded) and ladder matches.

use crate::models::user::{PlayerRef, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    #[default]
    NotStarted,
    InProgress,
    Finished,
    Draw,
}

/// A bracket match. Knockout matches start with both slots empty until the
/// seeder assigns players; the winner is always a user id, never a name.
///
/// Invariant: `winner` is `Some` iff `status == Finished`, and it equals one
/// of the two seeded players' ids.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub match_id: MatchId,
    /// Optional display label, e.g. "Grand Final" or "3rd Place".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub player1: Option<PlayerRef>,
    pub player2: Option<PlayerRef>,
    pub score_player1: u32,
    pub score_player2: u32,
    pub winner: Option<UserId>,
    pub status: MatchStatus,
}

impl MatchRecord {
    /// A fresh match between two known players (round robin, or a seeded
    /// knockout slot).
    pub fn pairing(player1: PlayerRef, player2: PlayerRef) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            name: None,
            player1: Some(player1),
            player2: Some(player2),
            score_player1: 0,
            score_player2: 0,
            winner: None,
            status: MatchStatus::NotStarted,
        }
    }

    /// A knockout match whose players are not yet known.
    pub fn unseeded() -> Self {
        Self {
            match_id: Uuid::new_v4(),
            name: None,
            player1: None,
            player2: None,
            score_player1: 0,
            score_player2: 0,
            winner: None,
            status: MatchStatus::NotStarted,
        }
    }

    /// Attach a display label ("Grand Final", "3rd Place").
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fill the player slots of an unseeded match.
    pub fn seed(&mut self, player1: PlayerRef, player2: PlayerRef) {
        self.player1 = Some(player1);
        self.player2 = Some(player2);
    }

    /// Both slots seeded and the scores pick a winner.
    pub fn is_decided(&self) -> bool {
        self.player1.is_some()
            && self.player2.is_some()
            && self.score_player1 != self.score_player2
    }

    /// Update the scores; an edited match is in progress until the round is
    /// finished.
    pub fn set_score(&mut self, score_player1: u32, score_player2: u32) {
        self.score_player1 = score_player1;
        self.score_player2 = score_player2;
        self.status = MatchStatus::InProgress;
        self.winner = None;
    }

    /// The player reference of the side with the higher score, if decided.
    pub fn winning_player(&self) -> Option<&PlayerRef> {
        if !self.is_decided() {
            return None;
        }
        if self.score_player1 > self.score_player2 {
            self.player1.as_ref()
        } else {
            self.player2.as_ref()
        }
    }

    /// The player reference of the side with the lower score, if decided.
    pub fn losing_player(&self) -> Option<&PlayerRef> {
        if !self.is_decided() {
            return None;
        }
        if self.score_player1 > self.score_player2 {
            self.player2.as_ref()
        } else {
            self.player1.as_ref()
        }
    }

    /// Mark the match finished, recording the winner id from the scores.
    /// Caller must have checked `is_decided()`.
    pub fn finalize(&mut self) {
        if let Some(w) = self.winning_player() {
            self.winner = Some(w.user_id);
            self.status = MatchStatus::Finished;
        }
    }
}

/// Rating movement recorded on one side of a ladder match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub old_rating: i32,
    pub new_rating: i32,
    pub added_points: i32,
}

/// A ladder (non-tournament) match recorded in a room, with the rating
/// movement it caused stamped on both sides.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMatch {
    pub match_id: MatchId,
    pub room_id: Uuid,
    pub player1: PlayerRef,
    pub player2: PlayerRef,
    pub score_player1: u32,
    pub score_player2: u32,
    pub winner: UserId,
    /// "DD.MM.YYYY HH.MM.SS" local time.
    pub timestamp: String,
    pub rating_player1: Option<RatingChange>,
    pub rating_player2: Option<RatingChange>,
}
