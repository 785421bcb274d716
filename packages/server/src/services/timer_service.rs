use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::models::game::TickOutcome;
use crate::state::{AppState, RoomEvent, SharedSession};

/// Starts the countdown task for one room.
///
/// The task only holds a weak reference, so it winds down on its own once the
/// room leaves the store. Closing a room aborts it outright. A room nobody
/// watches or touches for the configured idle timeout is torn down here.
pub fn spawn_room_timer(state: &AppState, session: &SharedSession, room_code: String) -> JoinHandle<()> {
    let state = state.clone();
    let period = state.tick_interval();
    let idle_timeout = state.idle_timeout();
    let session = Arc::downgrade(session);
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;

            let session = match session.upgrade() {
                Some(session) => session,
                None => {
                    debug!("Room {} is gone, stopping its timer", room_code);
                    break;
                }
            };

            let abandoned = {
                let mut guard = session.lock().await;
                match guard.game.tick() {
                    TickOutcome::Idle => {}
                    TickOutcome::Running(_) | TickOutcome::Expired(None) => {
                        guard.publish(RoomEvent::StateChanged);
                    }
                    TickOutcome::Expired(Some(change)) => {
                        info!(
                            "Room {} timer expired, moved from {} to {}",
                            room_code, change.from, change.to
                        );
                        guard.publish(RoomEvent::PhaseChanged(change));
                    }
                }
                guard.is_abandoned(idle_timeout)
            };

            // the store lock is never taken while holding the room lock
            if abandoned {
                if state.remove_session(&room_code, &session).await {
                    session.lock().await.close();
                    info!("Room {} was idle for {:?}, closed", room_code, idle_timeout);
                }
                break;
            }
        }
    })
}
