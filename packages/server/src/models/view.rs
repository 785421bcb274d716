use serde::{Deserialize, Serialize};

use super::game::{Game, GamePhase, Team};
use super::player::Player;
use super::role::Role;

/// What the host screen and every other player may see about a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayer {
    pub id: String,
    pub name: String,
    pub is_disabled: bool,
    pub is_detained: bool,
    pub has_voted: bool,
    pub role: Option<Role>, // only once detained or the game is over
}

impl PublicPlayer {
    fn from_player(player: &Player, reveal_all: bool) -> Self {
        let revealed = reveal_all || player.is_detained;
        PublicPlayer {
            id: player.id.clone(),
            name: player.name.clone(),
            is_disabled: player.is_disabled,
            is_detained: player.is_detained,
            has_voted: player.has_voted,
            role: revealed.then_some(player.role),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub room_code: String,
    pub phase: GamePhase,
    pub players: Vec<PublicPlayer>,
    pub timer: u32,
    pub round: u32,
    pub current_clue: Option<String>,
    pub last_disabled_player: Option<String>,
    pub last_detained_player: Option<String>,
    pub winner: Option<Team>,
    pub votes_received: usize,
    pub active_voters: usize,
}

impl GameView {
    pub fn public(game: &Game) -> Self {
        let reveal_all = game.phase == GamePhase::GameOver;
        let progress = game.vote_progress();
        GameView {
            room_code: game.room_code.clone(),
            phase: game.phase,
            players: game
                .players
                .iter()
                .map(|p| PublicPlayer::from_player(p, reveal_all))
                .collect(),
            timer: game.timer,
            round: game.round,
            current_clue: game.current_clue.clone(),
            last_disabled_player: game.last_disabled_player.clone(),
            last_detained_player: game.last_detained_player.clone(),
            winner: game.winner,
            votes_received: progress.votes_received,
            active_voters: progress.active_voters,
        }
    }
}

/// The public view plus the secrets only `player_id` is allowed to know.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: String,
    pub name: String,
    pub role: Role,
    pub partner_name: Option<String>,
    pub game: GameView,
}

impl PlayerView {
    pub fn for_player(game: &Game, player_id: &str) -> Option<Self> {
        let player = game.player(player_id)?;
        Some(PlayerView {
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            partner_name: player.partner_name.clone(),
            game: GameView::public(game),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::GameRules;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dealt_game() -> Game {
        let mut rng = StdRng::seed_from_u64(17);
        let mut game = Game::new("QRST".to_string(), GameRules::default());
        for name in ["Ana", "Ben", "Cleo", "Dmitri", "Eli"] {
            game.join("QRST", name).unwrap();
        }
        game.start_role_assignment(&mut rng).unwrap();
        game
    }

    #[test]
    fn public_view_hides_roles_until_detained() {
        let mut game = dealt_game();
        let view = GameView::public(&game);
        assert!(view.players.iter().all(|p| p.role.is_none()));

        game.start_action_phase().unwrap();
        let detainee = game.players[2].id.clone();
        game.finalize_votes(&detainee).unwrap();

        let view = GameView::public(&game);
        for player in &view.players {
            if player.id == detainee {
                assert_eq!(player.role, Some(game.players[2].role));
            } else if game.phase != GamePhase::GameOver {
                assert!(player.role.is_none());
            }
        }
    }

    #[test]
    fn player_view_carries_own_role_and_partner() {
        let game = dealt_game();
        let saboteur = game
            .players
            .iter()
            .find(|p| p.role == Role::Saboteur)
            .unwrap();
        let view = PlayerView::for_player(&game, &saboteur.id).unwrap();
        assert_eq!(view.role, Role::Saboteur);
        assert!(view.partner_name.is_some());
        assert_ne!(view.partner_name.as_deref(), Some(saboteur.name.as_str()));

        let serialized = serde_json::to_string(&view.game).unwrap();
        assert!(!serialized.contains("SABOTEUR"));
        assert!(PlayerView::for_player(&game, "nobody").is_none());
    }
}
