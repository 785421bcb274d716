use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clue::generate_clue;
use super::player::Player;
use super::role::{assign_roles, Role};
use super::room::{generate_room_code, normalize_room_code, RoomSummary};
use super::rule::GameRules;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,          // waiting for players
    RoleAssignment, // players read their secret role
    Action,         // saboteurs pick a target
    Discussion,     // clue on screen, table talks
    Vote,           // active players vote
    Reveal,         // detained player is shown
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::Lobby => "LOBBY",
            GamePhase::RoleAssignment => "ROLE_ASSIGNMENT",
            GamePhase::Action => "ACTION",
            GamePhase::Discussion => "DISCUSSION",
            GamePhase::Vote => "VOTE",
            GamePhase::Reveal => "REVEAL",
            GamePhase::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Saboteurs,
    Investigators,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid room code: {0}")]
    InvalidRoomCode(String),
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("at least {required} players are needed to start, {joined} joined")]
    InsufficientPlayers { required: usize, joined: usize },
    #[error("cannot {action} during the {phase} phase")]
    InvalidPhase {
        action: &'static str,
        phase: GamePhase,
    },
    #[error("player name must not be empty")]
    EmptyName,
    #[error("room is full ({0} players)")]
    RoomFull(usize),
    #[error("player {0} cannot vote")]
    IneligibleVoter(String),
    #[error("player {0} cannot be targeted")]
    IneligibleTarget(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: String,
    pub target_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub target_id: String,
    pub target_name: String,
    pub votes: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detainment {
    pub player_id: String,
    pub player_name: String,
    pub role: Role,
    pub winner: Option<Team>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteProgress {
    pub votes_received: usize,
    pub active_voters: usize,
    pub resolved: Option<Detainment>, // set when the vote closed automatically
}

impl VoteProgress {
    pub fn is_complete(&self) -> bool {
        self.votes_received >= self.active_voters
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: GamePhase,
    pub to: GamePhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,                         // no countdown running
    Running(u32),                 // seconds left
    Expired(Option<PhaseChange>), // hit zero; carries the auto-advance, if any
}

/// Authoritative state of one room.
///
/// Every operation validates before it mutates, so a returned error always
/// means the game was left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub room_code: String,
    pub phase: GamePhase,
    pub players: Vec<Player>, // join order
    pub timer: u32,
    pub current_clue: Option<String>,
    pub last_disabled_player: Option<String>,
    pub last_detained_player: Option<String>,
    pub winner: Option<Team>,
    pub round: u32,
    pub votes: Vec<Vote>, // arrival order, one per voter
    pub rules: GameRules,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game {{ room_code: {}, phase: {}, players: {}, round: {}, timer: {}, winner: {:?} }}",
            self.room_code,
            self.phase,
            self.players.len(),
            self.round,
            self.timer,
            self.winner
        )
    }
}

impl Game {
    pub fn new(room_code: String, rules: GameRules) -> Self {
        Game {
            room_code,
            phase: GamePhase::Lobby,
            players: Vec::new(),
            timer: 0,
            current_clue: None,
            last_disabled_player: None,
            last_detained_player: None,
            winner: None,
            round: 0,
            votes: Vec::new(),
            rules,
        }
    }

    /// Opens an empty lobby under a freshly drawn room code.
    pub fn create<R: Rng + ?Sized>(rules: GameRules, rng: &mut R) -> Self {
        Self::new(generate_room_code(rng), rules)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_index(&self, id: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))
    }

    fn expect_phase(&self, action: &'static str, allowed: &[GamePhase]) -> Result<(), GameError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn enter(&mut self, phase: GamePhase, seconds: u32) {
        self.phase = phase;
        self.timer = seconds;
    }

    /// Adds a player and returns the id the caller binds itself to.
    pub fn join(&mut self, code: &str, name: &str) -> Result<String, GameError> {
        if normalize_room_code(code) != self.room_code {
            return Err(GameError::InvalidRoomCode(code.to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }
        if self.players.len() >= self.rules.max_players {
            return Err(GameError::RoomFull(self.rules.max_players));
        }

        let id = Uuid::new_v4().to_string();
        let mut player = Player::new(id.clone(), name.to_string());
        // roles are already dealt; latecomers join the investigation
        if self.phase != GamePhase::Lobby {
            player.role = Role::Investigator;
        }
        self.players.push(player);
        Ok(id)
    }

    pub fn start_role_assignment<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.expect_phase("assign roles", &[GamePhase::Lobby])?;
        if self.players.len() < self.rules.min_players {
            return Err(GameError::InsufficientPlayers {
                required: self.rules.min_players,
                joined: self.players.len(),
            });
        }

        // the deal comes back sorted by name; keep join order here
        let mut dealt: HashMap<String, Player> =
            assign_roles(&self.players, self.rules.saboteur_count, rng)
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect();
        for player in &mut self.players {
            if let Some(dealt) = dealt.remove(&player.id) {
                player.role = dealt.role;
                player.partner_name = dealt.partner_name;
            }
        }

        self.enter(GamePhase::RoleAssignment, self.rules.role_reveal_seconds);
        Ok(())
    }

    pub fn start_action_phase(&mut self) -> Result<(), GameError> {
        self.expect_phase(
            "start an action phase",
            &[GamePhase::RoleAssignment, GamePhase::Reveal],
        )?;
        self.round += 1;
        self.current_clue = None;
        self.enter(GamePhase::Action, self.rules.action_seconds);
        Ok(())
    }

    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.start_action_phase()
    }

    pub fn saboteur_action<R: Rng + ?Sized>(
        &mut self,
        target_id: &str,
        rng: &mut R,
    ) -> Result<(), GameError> {
        let index = self.player_index(target_id)?;
        self.expect_phase("sabotage", &[GamePhase::Action])?;
        let target = &self.players[index];
        if target.role == Role::Saboteur || target.is_disabled || target.is_detained {
            return Err(GameError::IneligibleTarget(target_id.to_string()));
        }

        let clue = generate_clue(self, target_id, rng);
        let target = &mut self.players[index];
        target.is_disabled = true;
        self.last_disabled_player = Some(target.name.clone());
        self.current_clue = Some(clue);
        self.enter(GamePhase::Discussion, self.rules.discussion_seconds);
        Ok(())
    }

    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) -> Result<VoteProgress, GameError> {
        let voter = self.player_index(voter_id)?;
        let target = self.player_index(target_id)?;
        self.expect_phase("vote", &[GamePhase::Vote])?;
        if !self.players[voter].is_active() {
            return Err(GameError::IneligibleVoter(voter_id.to_string()));
        }
        if voter == target || self.players[target].is_detained {
            return Err(GameError::IneligibleTarget(target_id.to_string()));
        }

        // a changed vote goes to the back of the queue
        self.votes.retain(|v| v.voter_id != voter_id);
        self.votes.push(Vote {
            voter_id: voter_id.to_string(),
            target_id: target_id.to_string(),
        });
        self.players[voter].has_voted = true;

        let mut progress = self.vote_progress();
        if progress.is_complete() && self.rules.auto_resolve_votes {
            progress.resolved = self.resolve_votes()?;
        }
        Ok(progress)
    }

    pub fn vote_progress(&self) -> VoteProgress {
        VoteProgress {
            votes_received: self
                .players
                .iter()
                .filter(|p| p.has_voted && !p.is_detained)
                .count(),
            active_voters: self.players.iter().filter(|p| p.is_active()).count(),
            resolved: None,
        }
    }

    /// Votes per target, ordered by each target's earliest standing vote.
    pub fn tally(&self) -> Vec<VoteCount> {
        let mut counts: Vec<VoteCount> = Vec::new();
        for vote in &self.votes {
            match counts.iter_mut().find(|c| c.target_id == vote.target_id) {
                Some(count) => count.votes += 1,
                None => counts.push(VoteCount {
                    target_id: vote.target_id.clone(),
                    target_name: self
                        .player(&vote.target_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default(),
                    votes: 1,
                }),
            }
        }
        counts
    }

    /// Plurality winner of the current vote. Ties go to whoever received
    /// their standing vote first.
    pub fn leading_candidate(&self) -> Option<String> {
        let mut leader: Option<VoteCount> = None;
        for count in self.tally() {
            if leader.as_ref().map_or(true, |l| count.votes > l.votes) {
                leader = Some(count);
            }
        }
        leader.map(|l| l.target_id)
    }

    pub fn resolve_votes(&mut self) -> Result<Option<Detainment>, GameError> {
        match self.leading_candidate() {
            Some(target_id) => self.finalize_votes(&target_id).map(Some),
            None => Ok(None),
        }
    }

    pub fn finalize_votes(&mut self, target_id: &str) -> Result<Detainment, GameError> {
        let index = self.player_index(target_id)?;
        self.expect_phase(
            "detain a player",
            &[
                GamePhase::Action,
                GamePhase::Discussion,
                GamePhase::Vote,
                GamePhase::Reveal,
            ],
        )?;
        if self.players[index].is_detained {
            return Err(GameError::IneligibleTarget(target_id.to_string()));
        }

        self.players[index].is_detained = true;
        for player in &mut self.players {
            player.has_voted = false;
        }
        self.votes.clear();

        let target = &self.players[index];
        let mut detainment = Detainment {
            player_id: target.id.clone(),
            player_name: target.name.clone(),
            role: target.role,
            winner: None,
        };
        self.last_detained_player = Some(detainment.player_name.clone());

        self.winner = self.evaluate_winner();
        detainment.winner = self.winner;
        let next = if self.winner.is_some() {
            GamePhase::GameOver
        } else {
            GamePhase::Reveal
        };
        self.enter(next, self.rules.reveal_seconds);
        Ok(detainment)
    }

    /// Investigators win once no Saboteur is at large; Saboteurs win once no
    /// Investigator can still act. The Investigator check runs first.
    pub fn evaluate_winner(&self) -> Option<Team> {
        let saboteurs_at_large = self
            .players
            .iter()
            .filter(|p| p.role == Role::Saboteur && !p.is_detained)
            .count();
        if saboteurs_at_large == 0 {
            return Some(Team::Investigators);
        }

        let investigators_active = self
            .players
            .iter()
            .filter(|p| p.role == Role::Investigator && p.is_active())
            .count();
        if investigators_active == 0 {
            Some(Team::Saboteurs)
        } else {
            None
        }
    }

    /// One second of game time.
    pub fn tick(&mut self) -> TickOutcome {
        if self.timer == 0 {
            return TickOutcome::Idle;
        }
        self.timer -= 1;
        if self.timer > 0 {
            TickOutcome::Running(self.timer)
        } else {
            TickOutcome::Expired(self.on_timer_expired())
        }
    }

    /// Drops the countdown to zero and applies the expiry rules right away.
    pub fn skip_timer(&mut self) -> Option<PhaseChange> {
        self.timer = 0;
        self.on_timer_expired()
    }

    fn on_timer_expired(&mut self) -> Option<PhaseChange> {
        let from = self.phase;
        let advanced = match self.phase {
            GamePhase::RoleAssignment | GamePhase::Reveal => self.start_action_phase().is_ok(),
            GamePhase::Discussion => {
                self.enter(GamePhase::Vote, self.rules.vote_seconds);
                true
            }
            GamePhase::Vote if self.rules.resolve_votes_on_timeout => {
                matches!(self.resolve_votes(), Ok(Some(_)))
            }
            // action rounds and an unresolved vote wait for the host
            _ => false,
        };
        advanced.then(|| PhaseChange {
            from,
            to: self.phase,
        })
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_code: self.room_code.clone(),
            phase: self.phase,
            player_count: self.players.len(),
            round: self.round,
            winner: self.winner,
        }
    }
}
