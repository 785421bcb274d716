use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("saboteur_count must be at least 1")]
    NoSaboteurs,
    #[error("min_players ({min_players}) must exceed saboteur_count ({saboteur_count})")]
    TooFewPlayersForSaboteurs {
        min_players: usize,
        saboteur_count: usize,
    },
    #[error("max_players ({max_players}) is below min_players ({min_players})")]
    MaxBelowMin {
        min_players: usize,
        max_players: usize,
    },
    #[error("{0} must be at least 1")]
    ZeroDuration(&'static str),
}

/// Per-session rules, copied into every room when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub min_players: usize,
    pub max_players: usize,
    pub saboteur_count: usize,
    pub role_reveal_seconds: u32,
    pub action_seconds: u32,
    pub discussion_seconds: u32,
    pub vote_seconds: u32,
    pub reveal_seconds: u32,
    // finalize as soon as every active voter has voted
    pub auto_resolve_votes: bool,
    // finalize the leading candidate when the vote timer runs out
    pub resolve_votes_on_timeout: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 50,
            saboteur_count: 2,
            role_reveal_seconds: 10,
            action_seconds: 30,
            discussion_seconds: 120,
            vote_seconds: 30,
            reveal_seconds: 10,
            auto_resolve_votes: true,
            resolve_votes_on_timeout: true,
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.saboteur_count == 0 {
            return Err(ConfigError::NoSaboteurs);
        }
        if self.min_players <= self.saboteur_count {
            return Err(ConfigError::TooFewPlayersForSaboteurs {
                min_players: self.min_players,
                saboteur_count: self.saboteur_count,
            });
        }
        if self.max_players < self.min_players {
            return Err(ConfigError::MaxBelowMin {
                min_players: self.min_players,
                max_players: self.max_players,
            });
        }
        // a phase entered with zero seconds never ticks down to expiry
        let durations = [
            ("role_reveal_seconds", self.role_reveal_seconds),
            ("action_seconds", self.action_seconds),
            ("discussion_seconds", self.discussion_seconds),
            ("vote_seconds", self.vote_seconds),
            ("reveal_seconds", self.reveal_seconds),
        ];
        if let Some((name, _)) = durations.into_iter().find(|(_, seconds)| *seconds == 0) {
            return Err(ConfigError::ZeroDuration(name));
        }
        Ok(())
    }
}
