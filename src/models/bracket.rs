//! Bracket: the full ordered set of rounds plus progression state for one
//! tournament instance.

use crate::models::game_match::{MatchId, MatchRecord};
use crate::models::round::{Round, RoundStatus};
use crate::models::user::{PlayerRef, UserId};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building or advancing a bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Standard brackets support exactly 4, 6, 8 or 12 players.
    UnsupportedPlayerCount(usize),
    /// Iterative-elimination brackets need at least 3 players.
    NotEnoughPlayers(usize),
    /// The same user appears twice in the participant list.
    DuplicateParticipant(UserId),
    /// A match in the finishing round has equal scores (no winner).
    UndecidedMatch(MatchId),
    /// A match in the finishing round has empty player slots.
    UnseededMatch(MatchId),
    /// The given round index does not exist in this bracket.
    RoundNotFound(u32),
    /// Only the current round may be finished.
    NotCurrentRound { requested: u32, current: u32 },
    /// The round was already finished.
    RoundAlreadyFinished(u32),
    /// The bracket is completed; no further transitions are allowed.
    BracketCompleted,
    /// The match id is not part of the current round.
    MatchNotFound(MatchId),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::UnsupportedPlayerCount(n) => {
                write!(f, "Unsupported player count {} (need 4, 6, 8 or 12)", n)
            }
            BracketError::NotEnoughPlayers(n) => {
                write!(f, "Need at least 3 players for an elimination bracket (got {})", n)
            }
            BracketError::DuplicateParticipant(_) => {
                write!(f, "Participant list contains the same user twice")
            }
            BracketError::UndecidedMatch(_) => {
                write!(f, "A match has equal scores; every match needs a winner")
            }
            BracketError::UnseededMatch(_) => write!(f, "A match has no players assigned yet"),
            BracketError::RoundNotFound(i) => write!(f, "Round {} does not exist", i),
            BracketError::NotCurrentRound { requested, current } => {
                write!(f, "Round {} is not the current round ({})", requested, current)
            }
            BracketError::RoundAlreadyFinished(i) => write!(f, "Round {} is already finished", i),
            BracketError::BracketCompleted => write!(f, "Tournament is already completed"),
            BracketError::MatchNotFound(_) => write!(f, "Match not found in the current round"),
        }
    }
}

/// Overall bracket progression stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BracketStage {
    #[serde(rename = "roundRobinThenKO")]
    RoundRobinThenKo,
    #[serde(rename = "completed")]
    Completed,
}

/// How the bracket progresses from the round-robin stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketFormat {
    /// One round robin seeding a fixed knockout tree (4, 6, 8 or 12 players).
    #[default]
    Standard,
    /// Repeated round robins, dropping the lowest-ranked player each round
    /// until 4 remain, then the standard knockout tail.
    IterativeElimination,
}

/// One row of the final ranking. `place` values are unique and contiguous
/// from 1.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStanding {
    pub place: u32,
    pub user_id: UserId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub pf: u32,
    pub pa: u32,
}

/// Full bracket state. Created once from a fixed participant list, then
/// mutated only through round-completion transitions until completed.
///
/// Invariants: rounds appear in strictly increasing `round_index` order;
/// `current_round` points at an unfinished round until the bracket is
/// completed; once completed, `champion` and `final_stats` are set and no
/// rounds may be added.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub stage: BracketStage,
    pub format: BracketFormat,
    pub current_round: u32,
    pub champion: Option<PlayerRef>,
    pub final_stats: Option<Vec<FinalStanding>>,
    pub rounds: Vec<Round>,
}

impl Bracket {
    pub fn round(&self, round_index: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_index == round_index)
    }

    pub fn round_mut(&mut self, round_index: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.round_index == round_index)
    }

    /// The round `current_round` points at.
    pub fn active_round(&self) -> Option<&Round> {
        self.round(self.current_round)
    }

    /// Every match across all rounds, in round order.
    pub fn all_matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    /// Edit the scores of a match in the current round. Rejected once the
    /// bracket is completed or when the match belongs to another round.
    pub fn set_match_score(
        &mut self,
        match_id: MatchId,
        score_player1: u32,
        score_player2: u32,
    ) -> Result<(), BracketError> {
        if self.stage == BracketStage::Completed {
            return Err(BracketError::BracketCompleted);
        }
        let current = self.current_round;
        let round = self
            .round_mut(current)
            .ok_or(BracketError::RoundNotFound(current))?;
        if round.status == RoundStatus::Finished {
            return Err(BracketError::RoundAlreadyFinished(current));
        }
        let m = round
            .find_match_mut(match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?;
        if m.player1.is_none() || m.player2.is_none() {
            return Err(BracketError::UnseededMatch(match_id));
        }
        m.set_score(score_player1, score_player2);
        Ok(())
    }
}
