use tracing::info;

use super::ServiceError;
use crate::{
    models::{
        game::{Detainment, GameError, PhaseChange, Team, VoteCount, VoteProgress},
        view::{GameView, PlayerView},
    },
    state::AppState,
};

pub async fn start_game(state: &AppState, room_code: &str) -> Result<(), ServiceError> {
    state
        .update_room(room_code, |game| {
            game.start_role_assignment(&mut rand::thread_rng())
        })
        .await?;
    info!("Roles dealt in room {}", room_code);
    Ok(())
}

pub async fn start_action_phase(state: &AppState, room_code: &str) -> Result<(), ServiceError> {
    state
        .update_room(room_code, |game| game.start_action_phase())
        .await
}

pub async fn next_round(state: &AppState, room_code: &str) -> Result<(), ServiceError> {
    state.update_room(room_code, |game| game.next_round()).await
}

/// Host fast-forward: applies whatever the timer would do at zero.
pub async fn skip_timer(state: &AppState, room_code: &str) -> Result<Option<PhaseChange>, ServiceError> {
    state
        .update_room(room_code, |game| Ok(game.skip_timer()))
        .await
}

pub async fn sabotage(state: &AppState, room_code: &str, target_id: &str) -> Result<(), ServiceError> {
    state
        .update_room(room_code, |game| {
            game.saboteur_action(target_id, &mut rand::thread_rng())
        })
        .await?;
    info!("Player {} was disabled in room {}", target_id, room_code);
    Ok(())
}

pub async fn cast_vote(
    state: &AppState,
    room_code: &str,
    voter_id: &str,
    target_id: &str,
) -> Result<VoteProgress, ServiceError> {
    let progress = state
        .update_room(room_code, |game| game.cast_vote(voter_id, target_id))
        .await?;
    if let Some(detainment) = &progress.resolved {
        info!(
            "All votes in for room {}, {} detained",
            room_code, detainment.player_name
        );
    }
    Ok(progress)
}

pub async fn finalize_votes(
    state: &AppState,
    room_code: &str,
    target_id: &str,
) -> Result<Detainment, ServiceError> {
    let detainment = state
        .update_room(room_code, |game| game.finalize_votes(target_id))
        .await?;
    info!(
        "Room {} detained {} ({})",
        room_code, detainment.player_name, detainment.role
    );
    if let Some(winner) = detainment.winner {
        info!("Room {} is over, winner: {:?}", room_code, winner);
    }
    Ok(detainment)
}

pub async fn resolve_votes(state: &AppState, room_code: &str) -> Result<Option<Detainment>, ServiceError> {
    state
        .update_room(room_code, |game| game.resolve_votes())
        .await
}

pub async fn get_game_state(state: &AppState, room_code: &str) -> Result<GameView, ServiceError> {
    state
        .read_room(room_code, |game| Ok(GameView::public(game)))
        .await
}

pub async fn get_player_view(
    state: &AppState,
    room_code: &str,
    player_id: &str,
) -> Result<PlayerView, ServiceError> {
    state
        .read_room(room_code, |game| {
            PlayerView::for_player(game, player_id)
                .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))
        })
        .await
}

pub async fn get_tally(state: &AppState, room_code: &str) -> Result<Vec<VoteCount>, ServiceError> {
    state.read_room(room_code, |game| Ok(game.tally())).await
}

pub async fn check_winner(state: &AppState, room_code: &str) -> Result<Option<Team>, ServiceError> {
    state.read_room(room_code, |game| Ok(game.winner)).await
}
