use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::models::game::GameError;
use crate::services::ServiceError;
use crate::state::AppState;

mod game;
mod room;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/room", room::routes(state.clone()))
        .nest("/api/game", game::routes(state))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::RoomCodeExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Game(e) => match e {
                GameError::InvalidRoomCode(_) | GameError::UnknownPlayer(_) => {
                    StatusCode::NOT_FOUND
                }
                GameError::InvalidPhase { .. } | GameError::RoomFull(_) => StatusCode::CONFLICT,
                GameError::EmptyName
                | GameError::InsufficientPlayers { .. }
                | GameError::IneligibleVoter(_)
                | GameError::IneligibleTarget(_) => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
