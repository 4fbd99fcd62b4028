//! Club operations: user registration, room membership, ladder match
//! recording, season rating recompute, and tournament lifecycle. Each
//! operation composes the pure logic with one read/write pass over the
//! document store.

use crate::logic::{self, rating};
use crate::models::{
    now_timestamp, Achievement, AchievementKind, Bracket, BracketError, BracketFormat, MatchId,
    RecordedMatch, Room, RoomId, TournamentRoom, User, UserId,
};
use crate::store::{
    self, read_all_docs, read_doc, write_doc, DocumentStore, StoreError, MATCHES, ROOMS,
    TOURNAMENT_ROOMS, USERS,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors surfaced by club operations.
#[derive(Clone, Debug)]
pub enum ClubError {
    Store(StoreError),
    Bracket(BracketError),
    UserNotFound(UserId),
    RoomNotFound(RoomId),
    TournamentNotFound(RoomId),
    MatchNotFound(MatchId),
    NotRoomMember(UserId),
    /// Ladder matches need a winner; equal scores are rejected.
    DrawnScore,
    EmptyName,
    DuplicateUserName,
}

impl std::fmt::Display for ClubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClubError::Store(e) => write!(f, "{}", e),
            ClubError::Bracket(e) => write!(f, "{}", e),
            ClubError::UserNotFound(_) => write!(f, "User not found"),
            ClubError::RoomNotFound(_) => write!(f, "Room not found"),
            ClubError::TournamentNotFound(_) => write!(f, "Tournament not found"),
            ClubError::MatchNotFound(_) => write!(f, "Match not found"),
            ClubError::NotRoomMember(_) => write!(f, "Player is not a member of this room"),
            ClubError::DrawnScore => write!(f, "A match needs a winner; scores must differ"),
            ClubError::EmptyName => write!(f, "Name must not be empty"),
            ClubError::DuplicateUserName => write!(f, "A user with this name already exists"),
        }
    }
}

impl From<StoreError> for ClubError {
    fn from(e: StoreError) -> Self {
        ClubError::Store(e)
    }
}

impl From<BracketError> for ClubError {
    fn from(e: BracketError) -> Self {
        ClubError::Bracket(e)
    }
}

impl ClubError {
    /// Whether this error means "the referenced document does not exist"
    /// (mapped to 404 at the API boundary).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClubError::UserNotFound(_)
                | ClubError::RoomNotFound(_)
                | ClubError::TournamentNotFound(_)
                | ClubError::MatchNotFound(_)
        )
    }
}

/// Register a new user. Names are unique, case-insensitive.
pub fn register_user(store: &dyn DocumentStore, name: &str) -> Result<User, ClubError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClubError::EmptyName);
    }
    let existing: Vec<User> = read_all_docs(store, USERS)?;
    if existing.iter().any(|u| u.name.eq_ignore_ascii_case(name)) {
        return Err(ClubError::DuplicateUserName);
    }
    let user = User::new(name);
    write_doc(store, USERS, &user.user_id.to_string(), &user)?;
    Ok(user)
}

pub fn get_user(store: &dyn DocumentStore, user_id: UserId) -> Result<User, ClubError> {
    read_doc(store, USERS, &user_id.to_string())?.ok_or(ClubError::UserNotFound(user_id))
}

pub fn list_users(store: &dyn DocumentStore) -> Result<Vec<User>, ClubError> {
    Ok(read_all_docs(store, USERS)?)
}

/// Create a room; the creator becomes its first member.
pub fn create_room(
    store: &dyn DocumentStore,
    name: &str,
    creator: UserId,
) -> Result<Room, ClubError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClubError::EmptyName);
    }
    get_user(store, creator)?;
    let room = Room::new(name, creator);
    write_doc(store, ROOMS, &room.room_id.to_string(), &room)?;
    Ok(room)
}

pub fn get_room(store: &dyn DocumentStore, room_id: RoomId) -> Result<Room, ClubError> {
    read_doc(store, ROOMS, &room_id.to_string())?.ok_or(ClubError::RoomNotFound(room_id))
}

pub fn join_room(
    store: &dyn DocumentStore,
    room_id: RoomId,
    user_id: UserId,
) -> Result<Room, ClubError> {
    get_user(store, user_id)?;
    let mut room = get_room(store, room_id)?;
    if !room.is_member(user_id) {
        room.members.push(user_id);
        write_doc(store, ROOMS, &room.room_id.to_string(), &room)?;
    }
    Ok(room)
}

/// Rooms this user belongs to: a full-collection scan filtered in
/// application code (the store has no query interface).
pub fn rooms_for_user(store: &dyn DocumentStore, user_id: UserId) -> Result<Vec<Room>, ClubError> {
    let rooms: Vec<Room> = read_all_docs(store, ROOMS)?;
    Ok(rooms.into_iter().filter(|r| r.is_member(user_id)).collect())
}

/// Record a ladder match in a room: both players must be members, scores
/// must differ. Applies the rating movement to both user documents and
/// persists the match with a fresh timestamp.
pub fn record_match(
    store: &dyn DocumentStore,
    room_id: RoomId,
    player1_id: UserId,
    player2_id: UserId,
    score_player1: u32,
    score_player2: u32,
) -> Result<RecordedMatch, ClubError> {
    if score_player1 == score_player2 {
        return Err(ClubError::DrawnScore);
    }
    let room = get_room(store, room_id)?;
    for id in [player1_id, player2_id] {
        if !room.is_member(id) {
            return Err(ClubError::NotRoomMember(id));
        }
    }
    let mut player1 = get_user(store, player1_id)?;
    let mut player2 = get_user(store, player2_id)?;

    let player1_won = score_player1 > score_player2;
    let (c1, c2) = rating::rate_match(player1.rating, player2.rating, player1_won);

    player1.rating = c1.new_rating;
    player2.rating = c2.new_rating;
    if player1_won {
        player1.add_win();
        player2.add_loss();
    } else {
        player2.add_win();
        player1.add_loss();
    }

    let recorded = RecordedMatch {
        match_id: Uuid::new_v4(),
        room_id,
        player1: player1.as_player_ref(),
        player2: player2.as_player_ref(),
        score_player1,
        score_player2,
        winner: if player1_won { player1_id } else { player2_id },
        timestamp: now_timestamp(),
        rating_player1: Some(c1),
        rating_player2: Some(c2),
    };

    write_doc(store, MATCHES, &recorded.match_id.to_string(), &recorded)?;
    write_doc(store, USERS, &player1.user_id.to_string(), &player1)?;
    write_doc(store, USERS, &player2.user_id.to_string(), &player2)?;
    Ok(recorded)
}

/// Undo a recorded match: restore both players' pre-match ratings from the
/// deltas stored on the match, decrement the win/loss counters, and delete
/// the match document.
///
/// Known limitation: this reverses only this match's own delta. Deleting a
/// match that is not the most recent one leaves every later match's stored
/// ratings stale; a full season recompute is the only way to repair that.
pub fn undo_match(store: &dyn DocumentStore, match_id: MatchId) -> Result<(), ClubError> {
    let recorded: RecordedMatch = read_doc(store, MATCHES, &match_id.to_string())?
        .ok_or(ClubError::MatchNotFound(match_id))?;

    let sides = [
        (&recorded.player1, recorded.rating_player1),
        (&recorded.player2, recorded.rating_player2),
    ];
    for (player, change) in sides {
        match read_doc::<User>(store, USERS, &player.user_id.to_string())? {
            Some(mut user) => {
                if let Some(change) = change {
                    user.rating = change.old_rating;
                }
                if recorded.winner == player.user_id {
                    user.wins = user.wins.saturating_sub(1);
                } else {
                    user.losses = user.losses.saturating_sub(1);
                }
                write_doc(store, USERS, &user.user_id.to_string(), &user)?;
            }
            None => {
                log::warn!(
                    "undo of match {}: user {} no longer exists, skipping rating restore",
                    match_id,
                    player.user_id
                );
            }
        }
    }

    store.remove(MATCHES, &match_id.to_string())?;
    Ok(())
}

/// Recompute every player's rating by replaying the full match history in
/// chronological order, rewriting the per-match rating deltas and each
/// user's current rating.
pub fn recompute_season_ratings(
    store: &dyn DocumentStore,
) -> Result<HashMap<UserId, i32>, ClubError> {
    let mut matches: Vec<RecordedMatch> = read_all_docs(store, MATCHES)?;
    let ratings = rating::replay_ratings(&mut matches);

    for m in &matches {
        write_doc(store, MATCHES, &m.match_id.to_string(), m)?;
    }
    for (&user_id, &new_rating) in &ratings {
        match read_doc::<User>(store, USERS, &user_id.to_string())? {
            Some(mut user) => {
                user.rating = new_rating;
                write_doc(store, USERS, &user.user_id.to_string(), &user)?;
            }
            None => log::warn!("season recompute: user {} no longer exists, skipping", user_id),
        }
    }
    Ok(ratings)
}

/// Create a tournament room: resolve player snapshots from the user
/// documents (a missing user is a creation error), build the bracket
/// skeleton, persist the whole room.
pub fn create_tournament(
    store: &dyn DocumentStore,
    name: &str,
    user_ids: &[UserId],
    format: BracketFormat,
) -> Result<TournamentRoom, ClubError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClubError::EmptyName);
    }
    let mut participants = Vec::with_capacity(user_ids.len());
    for &id in user_ids {
        participants.push(get_user(store, id)?.as_player_ref());
    }
    let bracket = logic::build_bracket_skeleton(&participants, format)?;
    let room = TournamentRoom::new(name, bracket);
    write_doc(store, TOURNAMENT_ROOMS, &room.room_id.to_string(), &room)?;
    log::info!(
        "created tournament '{}' ({} players, {:?})",
        room.name,
        participants.len(),
        format
    );
    Ok(room)
}

pub fn get_tournament(
    store: &dyn DocumentStore,
    room_id: RoomId,
) -> Result<TournamentRoom, ClubError> {
    read_doc(store, TOURNAMENT_ROOMS, &room_id.to_string())?
        .ok_or(ClubError::TournamentNotFound(room_id))
}

/// Edit a current-round match's scores and persist the whole tournament
/// document, appending an audit entry to the room's match log.
pub fn set_tournament_score(
    store: &dyn DocumentStore,
    room_id: RoomId,
    match_id: MatchId,
    score_player1: u32,
    score_player2: u32,
) -> Result<TournamentRoom, ClubError> {
    let mut room = get_tournament(store, room_id)?;
    room.bracket
        .set_match_score(match_id, score_player1, score_player2)?;
    write_doc(store, TOURNAMENT_ROOMS, &room.room_id.to_string(), &room)?;

    let audit = serde_json::json!({
        "matchId": match_id,
        "scorePlayer1": score_player1,
        "scorePlayer2": score_player2,
        "recordedAt": now_timestamp(),
    });
    store.write(
        &store::tournament_match_log(&room_id.to_string()),
        &Uuid::new_v4().to_string(),
        audit,
    )?;
    Ok(room)
}

/// Finish the tournament's current round: apply the pure transition over the
/// bracket snapshot and persist the whole document once. When the bracket
/// completes, append a tournament-finish achievement to each ranked player
/// (a missing user is logged and skipped for that player only).
pub fn finish_round(store: &dyn DocumentStore, room_id: RoomId) -> Result<TournamentRoom, ClubError> {
    let mut room = get_tournament(store, room_id)?;
    let advanced = logic::apply_round_completion(&room.bracket, room.bracket.current_round)?;
    room.bracket = advanced;
    write_doc(store, TOURNAMENT_ROOMS, &room.room_id.to_string(), &room)?;

    if let Bracket {
        final_stats: Some(stats),
        ..
    } = &room.bracket
    {
        let date_finished = now_timestamp();
        for entry in stats {
            match read_doc::<User>(store, USERS, &entry.user_id.to_string())? {
                Some(mut user) => {
                    user.achievements.push(Achievement {
                        kind: AchievementKind::TournamentFinish,
                        date_finished: date_finished.clone(),
                        place: entry.place,
                        wins: entry.wins,
                        losses: entry.losses,
                        points_for: entry.pf,
                        points_against: entry.pa,
                        tournament_id: Some(room.room_id),
                        tournament_name: Some(room.name.clone()),
                        room_id: None,
                        room_name: None,
                    });
                    write_doc(store, USERS, &user.user_id.to_string(), &user)?;
                }
                None => log::warn!(
                    "tournament {}: user {} no longer exists, skipping achievement",
                    room.room_id,
                    entry.user_id
                ),
            }
        }
    }
    Ok(room)
}
