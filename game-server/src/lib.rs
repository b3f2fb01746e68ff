use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::game_service::GameService;
use crate::websocket::ConnectionManager;
use game_types::{GameError, GuessType, LobbyView, Player};

pub mod catalog;
pub mod config;
pub mod game_service;
pub mod websocket;

#[derive(Deserialize)]
struct CreateLobbyRequest {
    host_name: String,
}

#[derive(Deserialize)]
struct JoinLobbyRequest {
    join_code: String,
    name: String,
}

#[derive(Deserialize)]
struct TargetScoreRequest {
    player_id: Uuid,
    target_score: i32,
}

/// Body for host- or DJ-gated actions that need nothing but the actor.
#[derive(Deserialize)]
struct PlayerActionRequest {
    player_id: Uuid,
}

#[derive(Deserialize)]
struct AttemptRequest {
    player_id: Uuid,
    guess_type: GuessType,
    x_year: i32,
    y_year: Option<i32>,
}

#[derive(Deserialize)]
struct GameViewQuery {
    player_id: Uuid,
}

#[derive(Serialize)]
struct LobbyJoinResponse {
    lobby: LobbyView,
    player: Player,
}

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    game_service: Arc<GameService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let game_service_filter = warp::any().map({
        let game_service = game_service.clone();
        move || game_service.clone()
    });

    // WebSocket endpoint
    let websocket_route = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .and(game_service_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, service| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, conn_mgr, service))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_lobby = warp::path!("api" / "lobbies")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_create_lobby);

    let join_lobby = warp::path!("api" / "lobbies" / "join")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_join_lobby);

    // Lobby lookup by the code players type in
    let lobby_view = warp::path!("api" / "lobbies" / String)
        .and(warp::get())
        .and(game_service_filter.clone())
        .and_then(handle_lobby_view);

    let target_score = warp::path!("api" / "lobbies" / Uuid / "target-score")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_target_score);

    let start_game = warp::path!("api" / "lobbies" / Uuid / "start")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_start_game);

    let dj_ready = warp::path!("api" / "lobbies" / Uuid / "dj-ready")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_dj_ready);

    let submit_attempt = warp::path!("api" / "lobbies" / Uuid / "attempts")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_submit_attempt);

    let advance_round = warp::path!("api" / "lobbies" / Uuid / "advance")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and_then(handle_advance_round);

    // Per-player game view - the show card is redacted for guessers
    let game_view = warp::path!("api" / "lobbies" / Uuid / "game")
        .and(warp::get())
        .and(warp::query::<GameViewQuery>())
        .and(game_service_filter.clone())
        .and_then(handle_game_view);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    websocket_route
        .or(health)
        .or(create_lobby)
        .or(join_lobby)
        .or(target_score)
        .or(start_game)
        .or(dj_ready)
        .or(submit_attempt)
        .or(advance_round)
        .or(game_view)
        .or(lobby_view)
        .with(cors)
        .with(warp::log("theme_timeline"))
}

async fn handle_create_lobby(
    request: CreateLobbyRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service.create_lobby(&request.host_name).await {
        Ok((lobby, player)) => Ok(warp::reply::with_status(
            warp::reply::json(&LobbyJoinResponse { lobby, player }),
            StatusCode::CREATED,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_join_lobby(
    request: JoinLobbyRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service
        .join_lobby(&request.join_code, &request.name)
        .await
    {
        Ok((lobby, player)) => Ok(warp::reply::with_status(
            warp::reply::json(&LobbyJoinResponse { lobby, player }),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_lobby_view(
    join_code: String,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service.lobby_view(&join_code).await {
        Ok(view) => Ok(warp::reply::with_status(
            warp::reply::json(&view),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_target_score(
    lobby_id: Uuid,
    request: TargetScoreRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service
        .set_target_score(lobby_id, request.player_id, request.target_score)
        .await
    {
        Ok(view) => Ok(warp::reply::with_status(
            warp::reply::json(&view),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_start_game(
    lobby_id: Uuid,
    request: PlayerActionRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service.start_game(lobby_id, request.player_id).await {
        Ok(view) => Ok(warp::reply::with_status(
            warp::reply::json(&view),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_dj_ready(
    lobby_id: Uuid,
    request: PlayerActionRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service.mark_dj_ready(lobby_id, request.player_id).await {
        Ok(state) => Ok(warp::reply::with_status(
            warp::reply::json(&state),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_submit_attempt(
    lobby_id: Uuid,
    request: AttemptRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service
        .submit_attempt(
            lobby_id,
            request.player_id,
            request.guess_type,
            request.x_year,
            request.y_year,
        )
        .await
    {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&outcome),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_advance_round(
    lobby_id: Uuid,
    request: PlayerActionRequest,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service
        .advance_round(lobby_id, request.player_id)
        .await
    {
        Ok(state) => Ok(warp::reply::with_status(
            warp::reply::json(&state),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

async fn handle_game_view(
    lobby_id: Uuid,
    query: GameViewQuery,
    game_service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_service.game_view(lobby_id, query.player_id).await {
        Ok(view) => Ok(warp::reply::with_status(
            warp::reply::json(&view),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(error)),
    }
}

fn error_reply(error: GameError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = error_status(&error);
    warp::reply::with_status(warp::reply::json(&error), status)
}

/// The error body is the serialized `GameError`; the status code is a
/// coarse HTTP summary of it.
fn error_status(error: &GameError) -> StatusCode {
    match error {
        GameError::NotHost | GameError::NotDj | GameError::NotYourTurn { .. } => {
            StatusCode::FORBIDDEN
        }
        GameError::GameAlreadyStarted | GameError::StateConflict => StatusCode::CONFLICT,
        GameError::LobbyNotFound { .. }
        | GameError::PlayerNotFound { .. }
        | GameError::ShowNotFound { .. }
        | GameError::GameNotStarted => StatusCode::NOT_FOUND,
        GameError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}
