use crate::models::game::GameError;

pub mod game_service;
pub mod room_service;
pub mod timer_service;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("could not allocate a free room code")]
    RoomCodeExhausted,
    #[error(transparent)]
    Game(#[from] GameError),
}
