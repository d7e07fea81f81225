//! The authoritative per-room game state and its phase machine.
//!
//! A `Game` is only ever mutated through the phase-gated operations below;
//! a failed operation leaves the state untouched. Concurrency is handled one
//! level up: the registry wraps each game in a lock, so operations never
//! interleave within a room.

mod round;
mod snapshot;

use crate::error::GameError;
use crate::types::*;
use crate::words;
use rand::seq::IndexedRandom;

/// Minimum total players (host included) required to start.
pub const MIN_PLAYERS: usize = 3;

#[derive(Debug, Clone)]
pub struct Game {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub config: GameConfig,
    pub phase: GamePhase,
    /// 1-based current round; 0 while in the lobby.
    pub round_no: u32,
    /// Insertion-ordered. Iteration order is what makes impostor
    /// reassignment after a disconnect deterministic.
    pub players: Vec<Player>,
    word: String,
    hint: String,
    /// (voter, target) in first-vote order; a revote updates in place so the
    /// tally iteration order stays stable.
    votes: Vec<(PlayerId, PlayerId)>,
}

/// What `remove_player` did, so the caller knows how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The host left; the room must be ended and discarded.
    HostLeft,
    Left { impostor_reassigned: bool },
}

/// Outcome of `next_round`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAdvance {
    Started,
    GameOver,
}

impl Game {
    /// Create a room with the caller already joined as host.
    pub fn new(
        code: RoomCode,
        host_id: PlayerId,
        host_name: &str,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if host_name.trim().is_empty() {
            return Err(GameError::EmptyName);
        }
        let pair = words::draw();
        Ok(Self {
            code,
            host_id: host_id.clone(),
            config,
            phase: GamePhase::Lobby,
            round_no: 0,
            players: vec![Player::new(host_id, host_name.trim().to_string(), true)],
            word: pair.word.to_string(),
            hint: pair.hint.to_string(),
            votes: Vec::new(),
        })
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Join a player while the room is still in the lobby.
    pub fn add_player(&mut self, id: PlayerId, name: &str) -> Result<(), GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::RoomAlreadyStarted);
        }
        if name.trim().is_empty() {
            return Err(GameError::EmptyName);
        }
        self.players
            .push(Player::new(id, name.trim().to_string(), false));
        Ok(())
    }

    /// Remove a player (usually because their connection dropped).
    ///
    /// If the impostor leaves mid-round, the role moves to the first
    /// remaining non-host player so the round stays playable; no
    /// re-randomization beyond that.
    pub fn remove_player(&mut self, id: &str) -> Removal {
        if id == self.host_id {
            return Removal::HostLeft;
        }
        let was_impostor = self
            .player(id)
            .map(|p| p.role == PlayerRole::Impostor)
            .unwrap_or(false);
        self.players.retain(|p| p.id != id);
        self.votes.retain(|(voter, target)| voter != id && target != id);

        let mut impostor_reassigned = false;
        if was_impostor && self.phase.is_playing() {
            if let Some(p) = self.players.iter_mut().find(|p| !p.is_host) {
                p.role = PlayerRole::Impostor;
                impostor_reassigned = true;
            }
        }
        Removal::Left {
            impostor_reassigned,
        }
    }

    /// Host-only: leave the lobby and start round 1.
    pub fn start_game(&mut self, caller: &str) -> Result<(), GameError> {
        if caller != self.host_id {
            return Err(GameError::NotHost);
        }
        if self.phase != GamePhase::Lobby {
            return Err(GameError::RoomAlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::TooFewPlayers);
        }
        self.round_no = 1;
        self.begin_round();
        Ok(())
    }

    /// Host-only: advance to the next round, or end the game once the
    /// configured round count is exhausted.
    pub fn next_round(&mut self, caller: &str) -> Result<RoundAdvance, GameError> {
        if caller != self.host_id {
            return Err(GameError::NotHost);
        }
        if self.phase != GamePhase::Revealed {
            return Err(GameError::WrongPhase);
        }
        if self.round_no >= self.config.total_rounds {
            self.phase = GamePhase::GameOver;
            return Ok(RoundAdvance::GameOver);
        }
        self.round_no += 1;
        self.begin_round();
        Ok(RoundAdvance::Started)
    }

    /// Host-only: back to the lobby with scores wiped.
    pub fn restart_game(&mut self, caller: &str) -> Result<(), GameError> {
        if caller != self.host_id {
            return Err(GameError::NotHost);
        }
        for p in &mut self.players {
            p.score = 0;
            p.role = PlayerRole::Regular;
            p.submission = None;
            p.decision = None;
        }
        self.votes.clear();
        self.phase = GamePhase::Lobby;
        self.round_no = 0;
        // Cosmetic pre-fill; start_game draws the real pair.
        let pair = words::draw();
        self.word = pair.word.to_string();
        self.hint = pair.hint.to_string();
        Ok(())
    }

    /// Draw a word pair, wipe per-round state, and pick a fresh impostor.
    fn begin_round(&mut self) {
        let pair = words::draw();
        self.word = pair.word.to_string();
        self.hint = pair.hint.to_string();
        self.votes.clear();
        for p in &mut self.players {
            p.submission = None;
            p.decision = None;
            p.role = PlayerRole::Regular;
        }
        self.assign_impostor();
        self.phase = GamePhase::Collecting;
    }

    /// Uniformly pick one non-host player as impostor.
    fn assign_impostor(&mut self) {
        let mut rng = rand::rng();
        let eligible: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_host)
            .map(|(i, _)| i)
            .collect();
        if let Some(&idx) = eligible.choose(&mut rng) {
            self.players[idx].role = PlayerRole::Impostor;
        }
    }

    pub fn impostor(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.role == PlayerRole::Impostor)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A lobby with a host and `extra` joined players.
    pub(crate) fn lobby_game(extra: usize) -> Game {
        let mut game = Game::new(
            "ABC123".to_string(),
            "host".to_string(),
            "Hosty",
            GameConfig::default(),
        )
        .unwrap();
        for i in 1..=extra {
            game.add_player(format!("p{i}"), &format!("Player {i}")).unwrap();
        }
        game
    }

    /// A started game with a deterministic impostor.
    pub(crate) fn started_game(extra: usize, impostor: &str) -> Game {
        let mut game = lobby_game(extra);
        game.start_game("host").unwrap();
        for p in &mut game.players {
            p.role = if p.id == impostor {
                PlayerRole::Impostor
            } else {
                PlayerRole::Regular
            };
        }
        game
    }

    #[test]
    fn test_new_game_rejects_empty_host_name() {
        let result = Game::new(
            "ABC123".to_string(),
            "host".to_string(),
            "   ",
            GameConfig::default(),
        );
        assert_eq!(result.unwrap_err(), GameError::EmptyName);
    }

    #[test]
    fn test_add_player_only_in_lobby() {
        let mut game = lobby_game(2);
        game.start_game("host").unwrap();

        let result = game.add_player("late".to_string(), "Latecomer");
        assert_eq!(result.unwrap_err(), GameError::RoomAlreadyStarted);
    }

    #[test]
    fn test_add_player_rejects_empty_name() {
        let mut game = lobby_game(0);
        let result = game.add_player("p1".to_string(), "  ");
        assert_eq!(result.unwrap_err(), GameError::EmptyName);
    }

    #[test]
    fn test_start_requires_three_players() {
        let mut game = lobby_game(1);
        assert_eq!(game.start_game("host").unwrap_err(), GameError::TooFewPlayers);

        game.add_player("p2".to_string(), "Player 2").unwrap();
        assert!(game.start_game("host").is_ok());
        assert_eq!(game.phase, GamePhase::Collecting);
        assert_eq!(game.round_no, 1);
    }

    #[test]
    fn test_start_requires_host() {
        let mut game = lobby_game(2);
        assert_eq!(game.start_game("p1").unwrap_err(), GameError::NotHost);
        assert_eq!(game.phase, GamePhase::Lobby);
    }

    #[test]
    fn test_exactly_one_non_host_impostor() {
        // Repeated draws: always exactly one impostor and never the host.
        for _ in 0..25 {
            let mut game = lobby_game(3);
            game.start_game("host").unwrap();

            let impostors: Vec<_> = game
                .players
                .iter()
                .filter(|p| p.role == PlayerRole::Impostor)
                .collect();
            assert_eq!(impostors.len(), 1);
            assert!(!impostors[0].is_host);
        }
    }

    #[test]
    fn test_remove_host_signals_host_left() {
        let mut game = lobby_game(2);
        assert_eq!(game.remove_player("host"), Removal::HostLeft);
        // Caller is responsible for disposal; the game itself is unchanged.
        assert_eq!(game.players.len(), 3);
    }

    #[test]
    fn test_remove_impostor_reassigns_first_non_host() {
        let mut game = started_game(3, "p2");

        let removal = game.remove_player("p2");
        assert_eq!(
            removal,
            Removal::Left {
                impostor_reassigned: true
            }
        );
        // First non-host by iteration order picks up the role.
        assert_eq!(game.impostor().map(|p| p.id.as_str()), Some("p1"));
    }

    #[test]
    fn test_remove_regular_keeps_impostor() {
        let mut game = started_game(3, "p2");

        let removal = game.remove_player("p3");
        assert_eq!(
            removal,
            Removal::Left {
                impostor_reassigned: false
            }
        );
        assert_eq!(game.impostor().map(|p| p.id.as_str()), Some("p2"));
    }

    #[test]
    fn test_next_round_at_limit_ends_game() {
        let mut game = started_game(2, "p1");
        game.round_no = game.config.total_rounds;
        game.phase = GamePhase::Revealed;

        let advance = game.next_round("host").unwrap();
        assert_eq!(advance, RoundAdvance::GameOver);
        assert_eq!(game.phase, GamePhase::GameOver);
        // The round counter must not run past the configured total.
        assert_eq!(game.round_no, game.config.total_rounds);
    }

    #[test]
    fn test_next_round_advances_and_resets() {
        let mut game = started_game(2, "p1");
        game.player_mut("p1").unwrap().submission = Some("clue".to_string());
        game.phase = GamePhase::Revealed;

        let advance = game.next_round("host").unwrap();
        assert_eq!(advance, RoundAdvance::Started);
        assert_eq!(game.round_no, 2);
        assert_eq!(game.phase, GamePhase::Collecting);
        assert!(game.players.iter().all(|p| p.submission.is_none()));
        assert_eq!(
            game.players
                .iter()
                .filter(|p| p.role == PlayerRole::Impostor)
                .count(),
            1
        );
    }

    #[test]
    fn test_next_round_gated_on_revealed() {
        let mut game = started_game(2, "p1");
        assert_eq!(game.next_round("host").unwrap_err(), GameError::WrongPhase);
    }

    #[test]
    fn test_restart_resets_scores_and_phase() {
        let mut game = started_game(2, "p1");
        game.player_mut("p2").unwrap().score = 30;
        game.phase = GamePhase::GameOver;

        game.restart_game("host").unwrap();
        assert_eq!(game.phase, GamePhase::Lobby);
        assert_eq!(game.round_no, 0);
        assert!(game.players.iter().all(|p| p.score == 0));
        assert!(game.impostor().is_none());
    }

    #[test]
    fn test_restart_requires_host() {
        let mut game = started_game(2, "p1");
        assert_eq!(game.restart_game("p1").unwrap_err(), GameError::NotHost);
    }
}
