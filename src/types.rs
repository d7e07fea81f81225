use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type RoomCode = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Collecting,
    Deciding,
    Voting,
    Revealed,
    GameOver,
}

impl GamePhase {
    /// True while a round is in flight and role assignments exist.
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            GamePhase::Collecting | GamePhase::Deciding | GamePhase::Voting | GamePhase::Revealed
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Regular,
    Impostor,
}

/// Per-room configuration, fixed at room creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub total_rounds: u32,
    /// Advisory round timer shown to clients; the server never enforces it.
    pub round_seconds: u32,
    /// Whether rounds include the optional DECIDING phase between
    /// collecting and voting.
    pub decision_phase: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            round_seconds: 60,
            decision_phase: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub role: PlayerRole,
    pub is_host: bool,
    /// Association text for the current round, if submitted.
    pub submission: Option<String>,
    /// Decision for the current round (rooms with the DECIDING phase only).
    pub decision: Option<bool>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            score: 0,
            role: PlayerRole::Regular,
            is_host,
            submission: None,
            decision: None,
        }
    }
}
