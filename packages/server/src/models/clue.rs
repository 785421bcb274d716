use rand::Rng;

use super::game::Game;
use super::role::Role;

/// Picks one discussion hint after `disabled_id` was sabotaged.
///
/// Every template is built from a weak fact about the table (list position,
/// name length parity, join order) or from a coin flip, so no single clue
/// pins down a Saboteur.
pub fn generate_clue<R: Rng + ?Sized>(game: &Game, disabled_id: &str, rng: &mut R) -> String {
    let players = &game.players;
    let half = (players.len() + 1) / 2;

    let mut pool = vec![
        format!(
            "The frequency of the blackout suggests the intruder is among the first {} players joined.",
            half
        ),
        format!(
            "Electronic interference points to a Saboteur who {} voted in previous rounds.",
            if rng.gen_bool(0.5) { "has" } else { "has not" }
        ),
        format!(
            "Thermal signatures indicate the Saboteur is hidden near the {} of the group.",
            if rng.gen_bool(0.5) { "center" } else { "edge" }
        ),
    ];

    if let Some(position) = players.iter().position(|p| p.id == disabled_id) {
        let side = if position < half { "top" } else { "bottom" };
        pool.push(format!(
            "The Saboteur selected someone from the {} half of the list.",
            side
        ));
    }

    if let Some(saboteur) = players.iter().find(|p| p.role == Role::Saboteur) {
        let parity = if saboteur.name.chars().count() % 2 == 0 {
            "even"
        } else {
            "odd"
        };
        pool.push(format!(
            "A clue suggests the Saboteur's name has {} characters.",
            parity
        ));
    }

    let pick = rng.gen_range(0..pool.len());
    pool.swap_remove(pick)
}
