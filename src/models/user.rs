//! Users, immutable player snapshots, and achievement records.

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered user.
pub type UserId = Uuid;

/// Immutable identity snapshot copied into matches and brackets at creation
/// time. Never re-resolved, so a bracket survives a later name change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub user_id: UserId,
    pub name: String,
}

impl PlayerRef {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

/// What kind of finish an achievement records.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    SeasonFinish,
    MonthlyFinish,
    TournamentFinish,
}

/// One entry in a user's achievement list. Append-only: the club code adds
/// entries and never removes or rewrites past ones.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    /// Locale timestamp, same "DD.MM.YYYY HH.MM.SS" format as matches.
    pub date_finished: String,
    pub place: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
}

/// A registered club member with their running ladder rating.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub achievements: Vec<Achievement>,
}

impl User {
    /// Create a new user with the starting ladder rating.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name: name.into(),
            rating: crate::logic::rating::INITIAL_RATING,
            wins: 0,
            losses: 0,
            achievements: Vec::new(),
        }
    }

    /// Snapshot this user as a player reference for matches and brackets.
    pub fn as_player_ref(&self) -> PlayerRef {
        PlayerRef::new(self.user_id, self.name.clone())
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    pub fn add_loss(&mut self) {
        self.losses += 1;
    }
}

/// Current local time in the persisted timestamp format.
pub fn now_timestamp() -> String {
    Local::now().format("%d.%m.%Y %H.%M.%S").to_string()
}
