use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::{timer_service, ServiceError};
use crate::{
    models::{
        game::{Game, GameError},
        room::{normalize_room_code, RoomSummary},
        view::GameView,
    },
    state::{AppState, RoomSession},
};

const MAX_CODE_ATTEMPTS: usize = 64;

pub async fn create_room(state: &AppState) -> Result<String, ServiceError> {
    let mut rooms = state.rooms.lock().await;

    let game = {
        let mut rng = rand::thread_rng();
        let mut attempts = 0;
        loop {
            let game = Game::create(state.config.rules, &mut rng);
            if !rooms.contains_key(&game.room_code) {
                break game;
            }
            attempts += 1;
            if attempts >= MAX_CODE_ATTEMPTS {
                return Err(ServiceError::RoomCodeExhausted);
            }
        }
    };

    let room_code = game.room_code.clone();
    let session = Arc::new(Mutex::new(RoomSession::new(game)));
    let timer = timer_service::spawn_room_timer(state, &session, room_code.clone());
    session.lock().await.set_timer(timer);
    rooms.insert(room_code.clone(), session);

    info!("Room {} created", room_code);
    Ok(room_code)
}

/// Unknown rooms are reported as a bad code, the same as a mismatched one.
pub async fn join_room(state: &AppState, room_code: &str, name: &str) -> Result<String, ServiceError> {
    let player_id = state
        .update_room(room_code, |game| game.join(room_code, name))
        .await
        .map_err(|e| match e {
            ServiceError::RoomNotFound(code) => GameError::InvalidRoomCode(code).into(),
            other => other,
        })?;

    info!("Player {} ({}) joined room {}", name.trim(), player_id, room_code);
    Ok(player_id)
}

pub async fn get_rooms(state: &AppState) -> Vec<RoomSummary> {
    let sessions: Vec<_> = state.rooms.lock().await.values().cloned().collect();
    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions {
        summaries.push(session.lock().await.game.summary());
    }
    summaries.sort_by(|a, b| a.room_code.cmp(&b.room_code));
    summaries
}

pub async fn get_room_info(state: &AppState, room_code: &str) -> Result<GameView, ServiceError> {
    state
        .read_room(room_code, |game| Ok(GameView::public(game)))
        .await
}

/// Tears a room down: removes it from the store, stops its timer and tells
/// subscribers it is gone.
pub async fn close_room(state: &AppState, room_code: &str) -> Result<(), ServiceError> {
    let code = normalize_room_code(room_code);
    let session = state
        .rooms
        .lock()
        .await
        .remove(&code)
        .ok_or_else(|| ServiceError::RoomNotFound(room_code.to_string()))?;

    session.lock().await.close();

    info!("Room {} closed", code);
    Ok(())
}
