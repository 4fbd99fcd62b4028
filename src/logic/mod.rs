//! Tournament and rating logic: round-robin generation, standings, knockout
//! seeding, bracket transitions, and the ELO engine. Everything here is pure
//! over in-memory values; persistence happens in the club layer.

pub mod rating;
mod round_robin;
mod seeding;
mod standings;
mod transitions;

pub use round_robin::round_robin_matches;
pub use seeding::{pair_advancers, pair_by_seed};
pub use standings::{compute_table, StandingsRow};
pub use transitions::{apply_round_completion, build_bracket_skeleton};
