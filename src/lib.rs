//! Ping-pong club tracker: library with models, tournament logic, the ELO
//! rating engine, the document store, and club operations.

pub mod club;
pub mod logic;
pub mod models;
pub mod store;

pub use club::ClubError;
pub use logic::{
    apply_round_completion, build_bracket_skeleton, compute_table, round_robin_matches,
    StandingsRow,
};
pub use models::{
    Bracket, BracketError, BracketFormat, BracketStage, FinalStanding, MatchId, MatchRecord,
    MatchStatus, PlayerRef, RatingChange, RecordedMatch, Room, RoomId, Round, RoundStage,
    RoundStatus, TournamentRoom, User, UserId,
};
pub use store::{DocumentStore, MemoryStore, StoreError};
