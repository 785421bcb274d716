use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::{
    models::game::{PhaseChange, Team},
    services::{game_service, ServiceError},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct TargetAction {
    pub target_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteAction {
    pub voter_id: String,
    pub target_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WinnerResponse {
    pub winner: Option<Team>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkipResponse {
    pub phase_change: Option<PhaseChange>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:roomcode",
            Router::new()
                .route("/start", post(start_game))
                .route("/state", get(get_game_state))
                .route("/state/:playerid", get(get_player_view))
                .nest(
                    "/phase",
                    Router::new()
                        .route("/action", post(start_action_phase))
                        .route("/next-round", post(next_round))
                        .route("/skip", post(skip_timer)),
                )
                .nest(
                    "/actions",
                    Router::new()
                        .route("/sabotage", post(sabotage_handler))
                        .route("/vote", post(cast_vote_handler))
                        .route("/finalize", post(finalize_votes_handler))
                        .route("/resolve", post(resolve_votes_handler)),
                )
                .route("/tally", get(get_tally))
                .route("/check-winner", get(check_winner_handler)),
        )
        .with_state(state)
}

pub async fn start_game(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    game_service::start_game(&state, &room_code).await?;
    game_state_response(&state, &room_code).await
}

pub async fn get_game_state(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    game_state_response(&state, &room_code).await
}

async fn get_player_view(
    State(state): State<AppState>,
    Path((room_code, player_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = game_service::get_player_view(&state, &room_code, &player_id).await?;
    Ok(Json(view))
}

async fn start_action_phase(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    game_service::start_action_phase(&state, &room_code).await?;
    game_state_response(&state, &room_code).await
}

async fn next_round(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    game_service::next_round(&state, &room_code).await?;
    game_state_response(&state, &room_code).await
}

async fn skip_timer(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let phase_change = game_service::skip_timer(&state, &room_code).await?;
    Ok(Json(SkipResponse { phase_change }))
}

async fn sabotage_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Json(action): Json<TargetAction>,
) -> Result<impl IntoResponse, ServiceError> {
    game_service::sabotage(&state, &room_code, &action.target_id).await?;
    game_state_response(&state, &room_code).await
}

async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Json(vote_action): Json<VoteAction>,
) -> Result<impl IntoResponse, ServiceError> {
    let progress = game_service::cast_vote(
        &state,
        &room_code,
        &vote_action.voter_id,
        &vote_action.target_id,
    )
    .await?;
    Ok(Json(progress))
}

async fn finalize_votes_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Json(action): Json<TargetAction>,
) -> Result<impl IntoResponse, ServiceError> {
    let detainment = game_service::finalize_votes(&state, &room_code, &action.target_id).await?;
    Ok(Json(detainment))
}

async fn resolve_votes_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let detainment = game_service::resolve_votes(&state, &room_code).await?;
    Ok(Json(detainment))
}

async fn get_tally(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let tally = game_service::get_tally(&state, &room_code).await?;
    Ok(Json(tally))
}

async fn check_winner_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let winner = game_service::check_winner(&state, &room_code).await?;
    Ok((StatusCode::OK, Json(WinnerResponse { winner })))
}

async fn game_state_response(
    state: &AppState,
    room_code: &str,
) -> Result<impl IntoResponse, ServiceError> {
    let view = game_service::get_game_state(state, room_code).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ServerConfig;
    use crate::models::game::GamePhase;
    use crate::models::view::GameView;
    use crate::services::room_service;
    use crate::utils::test_setup::setup_test_env;
    use axum::{body::to_bytes, body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_start_game() {
        setup_test_env();
        let state = AppState::new(ServerConfig::default());
        let app = routes(state.clone());
        let room_code = room_service::create_room(&state).await.unwrap();
        for name in ["Ana", "Ben", "Cleo", "Dmitri"] {
            room_service::join_room(&state, &room_code, name).await.unwrap();
        }

        let request = Request::builder()
            .method("POST")
            .uri(&format!("/{}/start", room_code))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let view: GameView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.phase, GamePhase::RoleAssignment);
        assert_eq!(view.timer, 10);
        assert!(view.players.iter().all(|p| p.role.is_none()));
    }

    #[tokio::test]
    async fn test_start_game_without_enough_players() {
        setup_test_env();
        let state = AppState::new(ServerConfig::default());
        let app = routes(state.clone());
        let room_code = room_service::create_room(&state).await.unwrap();
        room_service::join_room(&state, &room_code, "Ana").await.unwrap();

        let request = Request::builder()
            .method("POST")
            .uri(&format!("/{}/start", room_code))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let view = game_service::get_game_state(&state, &room_code).await.unwrap();
        assert_eq!(view.phase, GamePhase::Lobby);
    }

    #[tokio::test]
    async fn test_sabotage_unknown_player_is_a_no_op() {
        setup_test_env();
        let state = AppState::new(ServerConfig::default());
        let app = routes(state.clone());
        let room_code = room_service::create_room(&state).await.unwrap();
        let before = game_service::get_game_state(&state, &room_code).await.unwrap();

        let request = Request::builder()
            .method("POST")
            .uri(&format!("/{}/actions/sabotage", room_code))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"target_id":"nonexistent"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let after = game_service::get_game_state(&state, &room_code).await.unwrap();
        assert_eq!(before, after);
    }
}
