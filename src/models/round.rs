//! Rounds: one stage of a bracket, with its participants and matches.

use crate::models::game_match::{MatchId, MatchRecord};
use crate::models::user::PlayerRef;
use serde::{Deserialize, Serialize};

/// Which kind of round this is. Transitions branch exhaustively on this tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundStage {
    RoundRobin,
    KnockoutQuarters,
    KnockoutSemis,
    KnockoutFinal,
}

/// Lifecycle of a round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundStatus {
    Waiting,
    Ongoing,
    Finished,
}

/// One round of a bracket.
///
/// Invariants: `round_index` is unique and strictly increasing across the
/// bracket; seeded matches reference only players in `participants`. For
/// knockout rounds, `participants` stays empty until the round is seeded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_index: u32,
    pub label: String,
    pub stage: RoundStage,
    pub status: RoundStatus,
    pub participants: Vec<PlayerRef>,
    pub matches: Vec<MatchRecord>,
}

impl Round {
    pub fn new(round_index: u32, label: impl Into<String>, stage: RoundStage) -> Self {
        Self {
            round_index,
            label: label.into(),
            stage,
            status: RoundStatus::Waiting,
            participants: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn find_match(&self, match_id: MatchId) -> Option<&MatchRecord> {
        self.matches.iter().find(|m| m.match_id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut MatchRecord> {
        self.matches.iter_mut().find(|m| m.match_id == match_id)
    }

    /// Every match is seeded and has a decided (unequal) score.
    pub fn all_decided(&self) -> bool {
        self.matches.iter().all(|m| m.is_decided())
    }
}
