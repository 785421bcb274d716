use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::models::game::{Game, GameError, GamePhase};
use crate::models::view::{GameView, PlayerView};
use crate::services::ServiceError;
use crate::state::{AppState, RoomEvent, RoomUpdate};

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub player_id: Option<String>, // omitted by the host screen
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ViewPayload {
    Player(PlayerView),
    Public(GameView),
}

#[derive(Debug, Serialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    State {
        room_code: String,
        view: ViewPayload,
    },
    PhaseChange {
        room_code: String,
        from_phase: GamePhase,
        to_phase: GamePhase,
        timestamp: String,
    },
    RoomClosed {
        room_code: String,
    },
}

/// Renders `game` for one subscriber. Players only ever receive their own
/// secrets; everyone else gets the public view.
fn render(game: &Game, viewer: Option<&str>) -> OutgoingMessage {
    let view = match viewer.and_then(|id| PlayerView::for_player(game, id)) {
        Some(view) => ViewPayload::Player(view),
        None => ViewPayload::Public(GameView::public(game)),
    };
    OutgoingMessage::State {
        room_code: game.room_code.clone(),
        view,
    }
}

fn messages_for(update: &RoomUpdate, viewer: Option<&str>) -> Vec<OutgoingMessage> {
    let room_code = update.game.room_code.clone();
    match &update.event {
        RoomEvent::StateChanged => vec![render(&update.game, viewer)],
        RoomEvent::PhaseChanged(change) => vec![
            OutgoingMessage::PhaseChange {
                room_code,
                from_phase: change.from,
                to_phase: change.to,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            render(&update.game, viewer),
        ],
        RoomEvent::Closed => vec![OutgoingMessage::RoomClosed { room_code }],
    }
}

fn to_text(message: &OutgoingMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            warn!("Failed to serialize outgoing message: {}", e);
            None
        }
    }
}

pub async fn handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state
        .session(&room_code)
        .await
        .ok_or_else(|| ServiceError::RoomNotFound(room_code.clone()))?;

    // subscribe before the upgrade so no update slips between snapshot and stream
    let (updates, initial) = {
        let session = session.lock().await;
        if let Some(player_id) = &query.player_id {
            if session.game.player(player_id).is_none() {
                return Err(GameError::UnknownPlayer(player_id.clone()).into());
            }
        }
        (session.subscribe(), render(&session.game, query.player_id.as_deref()))
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, updates, initial, query.player_id)))
}

pub async fn handle_socket(
    ws: WebSocket,
    mut updates: tokio::sync::broadcast::Receiver<RoomUpdate>,
    initial: OutgoingMessage,
    viewer: Option<String>,
) {
    let (mut sender, mut receiver) = ws.split();
    info!("New WebSocket subscriber, player: {:?}", viewer);

    let mut send_task = tokio::spawn(async move {
        if let Some(message) = to_text(&initial) {
            if sender.send(message).await.is_err() {
                return;
            }
        }

        loop {
            let update = match updates.recv().await {
                Ok(update) => update,
                // the next update carries a full snapshot anyway
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged by {} updates", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            for message in messages_for(&update, viewer.as_deref()) {
                if let Some(message) = to_text(&message) {
                    if let Err(e) = sender.send(message).await {
                        debug!("Subscriber went away: {}", e);
                        return;
                    }
                }
            }

            if update.event == RoomEvent::Closed {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    // read-only stream: drain until the client hangs up
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
}
