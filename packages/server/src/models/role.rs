use std::cmp::Ordering;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Pending,      // joined, not yet assigned
    Saboteur,     // hidden adversary
    Investigator, // majority
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Pending => write!(f, "Pending"),
            Role::Saboteur => write!(f, "Saboteur"),
            Role::Investigator => write!(f, "Investigator"),
        }
    }
}

/// Deals roles to `players`.
///
/// The players are permuted with a Fisher-Yates shuffle, the first
/// `saboteur_count` become Saboteurs and everyone else an Investigator. Each
/// Saboteur learns the name of the other Saboteur(s). The result is sorted by
/// display name so a host can list it without leaking the deal order.
pub fn assign_roles<R: Rng + ?Sized>(
    players: &[Player],
    saboteur_count: usize,
    rng: &mut R,
) -> Vec<Player> {
    let mut dealt = players.to_vec();
    dealt.shuffle(rng);

    let split = saboteur_count.min(dealt.len());
    let saboteur_names: Vec<(String, String)> = dealt[..split]
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    for (index, player) in dealt.iter_mut().enumerate() {
        if index < split {
            let partners: Vec<&str> = saboteur_names
                .iter()
                .filter(|(id, _)| *id != player.id)
                .map(|(_, name)| name.as_str())
                .collect();
            player.role = Role::Saboteur;
            player.partner_name = if partners.is_empty() {
                None
            } else {
                Some(partners.join(", "))
            };
        } else {
            player.role = Role::Investigator;
            player.partner_name = None;
        }
    }

    dealt.sort_by(|a, b| display_order(&a.name, &b.name));
    dealt
}

fn display_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
