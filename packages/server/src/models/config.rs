use std::env;
use std::net::SocketAddr;

use super::rule::{ConfigError, GameRules};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    // how often room timers tick; one tick is one second of game time
    pub tick_interval_ms: u64,
    // rooms with no subscribers and no activity for this long are torn down
    pub idle_room_timeout_secs: u64,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            allowed_origin: "http://localhost:3000".to_string(),
            tick_interval_ms: 1000,
            idle_room_timeout_secs: 1800,
            rules: GameRules::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `BLACKOUT_*` variables. Missing or unparsable values keep their
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rule_defaults = defaults.rules;

        let rules = GameRules {
            min_players: parse_var("BLACKOUT_MIN_PLAYERS").unwrap_or(rule_defaults.min_players),
            max_players: parse_var("BLACKOUT_MAX_PLAYERS").unwrap_or(rule_defaults.max_players),
            saboteur_count: parse_var("BLACKOUT_SABOTEUR_COUNT")
                .unwrap_or(rule_defaults.saboteur_count),
            role_reveal_seconds: parse_var("BLACKOUT_ROLE_REVEAL_SECONDS")
                .unwrap_or(rule_defaults.role_reveal_seconds),
            action_seconds: parse_var("BLACKOUT_ACTION_SECONDS")
                .unwrap_or(rule_defaults.action_seconds),
            discussion_seconds: parse_var("BLACKOUT_DISCUSSION_SECONDS")
                .unwrap_or(rule_defaults.discussion_seconds),
            vote_seconds: parse_var("BLACKOUT_VOTE_SECONDS").unwrap_or(rule_defaults.vote_seconds),
            reveal_seconds: parse_var("BLACKOUT_REVEAL_SECONDS")
                .unwrap_or(rule_defaults.reveal_seconds),
            auto_resolve_votes: env::var("BLACKOUT_AUTO_RESOLVE_VOTES")
                .map(|v| v == "true")
                .unwrap_or(rule_defaults.auto_resolve_votes),
            resolve_votes_on_timeout: env::var("BLACKOUT_RESOLVE_VOTES_ON_TIMEOUT")
                .map(|v| v == "true")
                .unwrap_or(rule_defaults.resolve_votes_on_timeout),
        };

        Self {
            bind_addr: parse_var("BLACKOUT_BIND_ADDR").unwrap_or(defaults.bind_addr),
            allowed_origin: env::var("BLACKOUT_ALLOWED_ORIGIN")
                .unwrap_or(defaults.allowed_origin),
            tick_interval_ms: parse_var("BLACKOUT_TICK_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_interval_ms),
            idle_room_timeout_secs: parse_var("BLACKOUT_IDLE_ROOM_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.idle_room_timeout_secs),
            rules,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn test_parse_var_ignores_garbage() {
        env::set_var("BLACKOUT_TEST_PARSE_NUMBER", " 42 ");
        env::set_var("BLACKOUT_TEST_PARSE_GARBAGE", "forty-two");
        assert_eq!(parse_var::<u32>("BLACKOUT_TEST_PARSE_NUMBER"), Some(42));
        assert_eq!(parse_var::<u32>("BLACKOUT_TEST_PARSE_GARBAGE"), None);
        assert_eq!(parse_var::<u32>("BLACKOUT_TEST_PARSE_MISSING"), None);
    }
}
