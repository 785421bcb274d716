use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    models::room::normalize_room_code,
    services::{room_service, ServiceError},
    state::AppState,
    utils::websocket,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub room_code: String,
    pub player_id: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // curl -X POST http://localhost:8080/api/room/create
        .route("/create", post(create_room))
        // curl http://localhost:8080/api/room/rooms
        .route("/rooms", get(get_rooms))
        // curl http://localhost:8080/api/room/{roomcode}
        .route("/:roomcode", get(get_room_info))
        // curl -X POST -H 'Content-Type: application/json' -d '{"name":"Ana"}' http://localhost:8080/api/room/{roomcode}/join
        .route("/:roomcode/join", post(join_room))
        // curl -X DELETE http://localhost:8080/api/room/{roomcode}/delete
        .route("/:roomcode/delete", delete(delete_room))
        // websocat 'ws://localhost:8080/api/room/{roomcode}/ws?player_id={playerid}'
        .route("/:roomcode/ws", get(websocket::handler))
        .with_state(state)
}

pub async fn create_room(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let room_code = room_service::create_room(&state).await?;
    Ok((StatusCode::CREATED, Json(CreateRoomResponse { room_code })))
}

async fn get_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = room_service::get_rooms(&state).await;
    (StatusCode::OK, Json(rooms))
}

async fn get_room_info(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = room_service::get_room_info(&state, &room_code).await?;
    Ok(Json(view))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let player_id = room_service::join_room(&state, &room_code, &request.name).await?;
    Ok(Json(JoinRoomResponse {
        room_code: normalize_room_code(&room_code),
        player_id,
    }))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    room_service::close_room(&state, &room_code).await?;
    Ok(StatusCode::NO_CONTENT)
}
