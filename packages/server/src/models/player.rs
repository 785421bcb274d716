use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub is_disabled: bool, // sabotaged: cannot vote or act, can still talk
    pub is_detained: bool, // out of the game for good
    pub has_voted: bool,
    pub partner_name: Option<String>, // saboteurs only
}

impl Player {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            role: Role::Pending,
            is_disabled: false,
            is_detained: false,
            has_voted: false,
            partner_name: None,
        }
    }

    /// Whether this player may currently cast a vote.
    pub fn is_active(&self) -> bool {
        !self.is_disabled && !self.is_detained
    }
}
