//! Data structures for the ping-pong club: users, rooms, matches, brackets.

mod bracket;
mod game_match;
mod room;
mod round;
mod user;

pub use bracket::{Bracket, BracketError, BracketFormat, BracketStage, FinalStanding};
pub use game_match::{MatchId, MatchRecord, MatchStatus, RatingChange, RecordedMatch};
pub use room::{Room, RoomId, TournamentRoom};
pub use round::{Round, RoundStage, RoundStatus};
pub use user::{now_timestamp, Achievement, AchievementKind, PlayerRef, User, UserId};
