use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::config::ServerConfig;
use crate::models::game::{Game, GameError, PhaseChange};
use crate::models::room::normalize_room_code;
use crate::services::ServiceError;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomEvent {
    StateChanged,
    PhaseChanged(PhaseChange),
    Closed,
}

/// A snapshot taken under the room lock, so subscribers never observe a
/// half-applied operation.
#[derive(Clone, Debug)]
pub struct RoomUpdate {
    pub event: RoomEvent,
    pub game: Arc<Game>,
}

pub struct RoomSession {
    pub game: Game,
    updates: broadcast::Sender<RoomUpdate>,
    timer: Option<JoinHandle<()>>,
    last_activity: Instant,
}

impl RoomSession {
    pub fn new(game: Game) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        RoomSession {
            game,
            updates,
            timer: None,
            last_activity: Instant::now(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomUpdate> {
        self.updates.subscribe()
    }

    pub fn publish(&self, event: RoomEvent) {
        // no subscribers is fine; the next one starts from a fresh snapshot
        let _ = self.updates.send(RoomUpdate {
            event,
            game: Arc::new(self.game.clone()),
        });
    }

    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        self.stop_timer();
        self.timer = Some(handle);
    }

    pub fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.as_ref().map_or(false, |t| !t.is_finished())
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Nobody is watching and nobody has acted for `timeout`.
    pub fn is_abandoned(&self, timeout: Duration) -> bool {
        self.updates.receiver_count() == 0 && self.last_activity.elapsed() >= timeout
    }

    /// Stops the timer and tells subscribers the room is gone.
    pub fn close(&mut self) {
        self.stop_timer();
        self.publish(RoomEvent::Closed);
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

pub type SharedSession = Arc<Mutex<RoomSession>>;

/// Session store keyed by room code. Each room has its own lock, which is
/// the single writer for that room.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<Mutex<HashMap<String, SharedSession>>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.idle_room_timeout_secs)
    }

    /// Removes `session` from the store, unless the code has since been
    /// reused by another room.
    pub async fn remove_session(&self, room_code: &str, session: &SharedSession) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(room_code) {
            Some(current) if Arc::ptr_eq(current, session) => {
                rooms.remove(room_code);
                true
            }
            _ => false,
        }
    }

    pub async fn session(&self, room_code: &str) -> Option<SharedSession> {
        let rooms = self.rooms.lock().await;
        rooms.get(&normalize_room_code(room_code)).cloned()
    }

    /// Runs `operation` under the room lock and broadcasts the result.
    pub async fn update_room<T, F>(&self, room_code: &str, operation: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        let session = self
            .session(room_code)
            .await
            .ok_or_else(|| ServiceError::RoomNotFound(room_code.to_string()))?;
        let mut session = session.lock().await;

        let from = session.game.phase;
        let value = match operation(&mut session.game) {
            Ok(value) => value,
            Err(e) => {
                debug!("Rejected operation in room {}: {}", room_code, e);
                return Err(e.into());
            }
        };

        session.touch();
        let to = session.game.phase;
        if from != to {
            info!("Room {} moved from {} to {}", session.game.room_code, from, to);
            session.publish(RoomEvent::PhaseChanged(PhaseChange { from, to }));
        } else {
            session.publish(RoomEvent::StateChanged);
        }
        Ok(value)
    }

    pub async fn read_room<T, F>(&self, room_code: &str, read: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Game) -> Result<T, GameError>,
    {
        let session = self
            .session(room_code)
            .await
            .ok_or_else(|| ServiceError::RoomNotFound(room_code.to_string()))?;
        let session = session.lock().await;
        read(&session.game).map_err(ServiceError::from)
    }
}
