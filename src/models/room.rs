//! Rooms: plain ladder rooms and tournament rooms carrying a bracket.

use crate::models::bracket::Bracket;
use crate::models::user::{now_timestamp, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a room (ladder or tournament).
pub type RoomId = Uuid;

/// A ladder room: a named group of members whose matches feed the rating
/// list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub name: String,
    pub members: Vec<UserId>,
    pub created_at: String,
}

impl Room {
    /// Create a room; the creator is its first member.
    pub fn new(name: impl Into<String>, creator: UserId) -> Self {
        Self {
            room_id: Uuid::new_v4(),
            name: name.into(),
            members: vec![creator],
            created_at: now_timestamp(),
        }
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

/// A tournament room: one bracket plus its display name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRoom {
    pub room_id: RoomId,
    pub name: String,
    pub bracket: Bracket,
    pub created_at: String,
}

impl TournamentRoom {
    pub fn new(name: impl Into<String>, bracket: Bracket) -> Self {
        Self {
            room_id: Uuid::new_v4(),
            name: name.into(),
            bracket,
            created_at: now_timestamp(),
        }
    }
}
