//! Single binary web server exposing the club API as REST over JSON.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default; override with env: HOST, PORT.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pingpong_club_web::club::{self, ClubError};
use pingpong_club_web::store::MemoryStore;
use pingpong_club_web::BracketFormat;
use serde::Deserialize;
use uuid::Uuid;

type AppState = Data<MemoryStore>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterUserBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomBody {
    name: String,
    user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomBody {
    user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordMatchBody {
    player1_id: Uuid,
    player2_id: Uuid,
    score_player1: u32,
    score_player2: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTournamentBody {
    name: String,
    user_ids: Vec<Uuid>,
    #[serde(default)]
    format: BracketFormat,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetScoreBody {
    match_id: Uuid,
    score_player1: u32,
    score_player2: u32,
}

/// Path segment: a single id (user, room, tournament, or match).
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Map a club error to a response: missing documents are 404, store failures
/// 500, everything else (validation, transition preconditions) 400.
fn error_response(e: &ClubError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if matches!(e, ClubError::Store(_)) {
        HttpResponse::InternalServerError().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pingpong-club-web",
    })
}

/// Register a user (names unique, case-insensitive).
#[post("/api/users")]
async fn api_register_user(state: AppState, body: Json<RegisterUserBody>) -> HttpResponse {
    match club::register_user(state.get_ref(), &body.name) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => error_response(&e),
    }
}

#[get("/api/users")]
async fn api_list_users(state: AppState) -> HttpResponse {
    match club::list_users(state.get_ref()) {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => error_response(&e),
    }
}

#[get("/api/users/{id}")]
async fn api_get_user(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::get_user(state.get_ref(), path.id) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => error_response(&e),
    }
}

/// Rooms the user is a member of.
#[get("/api/users/{id}/rooms")]
async fn api_rooms_for_user(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::rooms_for_user(state.get_ref(), path.id) {
        Ok(rooms) => HttpResponse::Ok().json(rooms),
        Err(e) => error_response(&e),
    }
}

/// Create a room; the creator joins automatically.
#[post("/api/rooms")]
async fn api_create_room(state: AppState, body: Json<CreateRoomBody>) -> HttpResponse {
    match club::create_room(state.get_ref(), &body.name, body.user_id) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

#[get("/api/rooms/{id}")]
async fn api_get_room(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::get_room(state.get_ref(), path.id) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

#[post("/api/rooms/{id}/join")]
async fn api_join_room(
    state: AppState,
    path: Path<IdPath>,
    body: Json<JoinRoomBody>,
) -> HttpResponse {
    match club::join_room(state.get_ref(), path.id, body.user_id) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

/// Record a ladder match; both players' ratings move immediately.
#[post("/api/rooms/{id}/matches")]
async fn api_record_match(
    state: AppState,
    path: Path<IdPath>,
    body: Json<RecordMatchBody>,
) -> HttpResponse {
    match club::record_match(
        state.get_ref(),
        path.id,
        body.player1_id,
        body.player2_id,
        body.score_player1,
        body.score_player2,
    ) {
        Ok(recorded) => HttpResponse::Ok().json(recorded),
        Err(e) => error_response(&e),
    }
}

/// Undo a recorded match (reverses its own rating delta only).
#[delete("/api/matches/{id}")]
async fn api_undo_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::undo_match(state.get_ref(), path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(&e),
    }
}

/// Replay the whole match history chronologically and rewrite all ratings.
#[post("/api/ratings/recompute")]
async fn api_recompute_ratings(state: AppState) -> HttpResponse {
    match club::recompute_season_ratings(state.get_ref()) {
        Ok(ratings) => {
            let by_id: std::collections::HashMap<String, i32> = ratings
                .into_iter()
                .map(|(id, r)| (id.to_string(), r))
                .collect();
            HttpResponse::Ok().json(by_id)
        }
        Err(e) => error_response(&e),
    }
}

/// Create a tournament from a fixed participant list (4, 6, 8 or 12 players
/// for the standard format).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    match club::create_tournament(state.get_ref(), &body.name, &body.user_ids, body.format) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::get_tournament(state.get_ref(), path.id) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

/// Edit the scores of a match in the current round.
#[put("/api/tournaments/{id}/matches/score")]
async fn api_set_tournament_score(
    state: AppState,
    path: Path<IdPath>,
    body: Json<SetScoreBody>,
) -> HttpResponse {
    match club::set_tournament_score(
        state.get_ref(),
        path.id,
        body.match_id,
        body.score_player1,
        body.score_player2,
    ) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

/// Finish the current round: finalize winners, seed the next round, and on
/// the final round crown the champion.
#[post("/api/tournaments/{id}/rounds/finish")]
async fn api_finish_round(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match club::finish_round(state.get_ref(), path.id) {
        Ok(room) => HttpResponse::Ok().json(room),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(MemoryStore::new());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_register_user)
            .service(api_list_users)
            .service(api_get_user)
            .service(api_rooms_for_user)
            .service(api_create_room)
            .service(api_get_room)
            .service(api_join_room)
            .service(api_record_match)
            .service(api_undo_match)
            .service(api_recompute_ratings)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_set_tournament_score)
            .service(api_finish_round)
    })
    .bind(bind)?
    .run()
    .await
}
