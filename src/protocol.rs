use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
        rounds_count: u32,
        round_time_seconds: u32,
        /// Enable the optional DECIDING phase for this room.
        #[serde(default)]
        decision_phase: bool,
    },
    JoinRoom {
        code: String,
        player_name: String,
    },
    // Host-only messages
    StartGame,
    NextRound,
    RestartGame,
    // Round actions (non-host players)
    SubmitAssociation {
        text: String,
    },
    SubmitDecision {
        decision: bool,
    },
    SubmitVote {
        target_id: PlayerId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        code: RoomCode,
        state: GameStateView,
    },
    /// Sent to the joining caller; the rest of the room gets `PlayerJoined`.
    Joined {
        state: GameStateView,
    },
    PlayerJoined {
        state: GameStateView,
    },
    GameStarted {
        state: GameStateView,
    },
    AssociationSubmitted {
        state: GameStateView,
    },
    DecisionStarted {
        state: GameStateView,
    },
    DecisionSubmitted {
        state: GameStateView,
    },
    VotingStarted {
        state: GameStateView,
    },
    VoteSubmitted {
        state: GameStateView,
    },
    VoteResults {
        results: VoteResults,
        state: GameStateView,
    },
    NextRoundStarted {
        state: GameStateView,
    },
    GameEnded {
        state: GameStateView,
    },
    GameRestarted {
        state: GameStateView,
    },
    PlayerLeft {
        state: GameStateView,
    },
    /// The host's connection dropped; the room is gone.
    HostDisconnected,
    Error {
        code: String,
        msg: String,
    },
}

/// Per-player redacted view of another player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub is_host: bool,
    /// Only ever true while a round is in flight; results shown after the
    /// game ends must not leak the role.
    pub is_impostor: bool,
    pub has_submitted: bool,
    pub has_decided: bool,
    /// Association text, visible from the voting phase onwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
}

/// The broadcast snapshot of a room, redacted for one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub code: RoomCode,
    pub phase: GamePhase,
    pub round_no: u32,
    pub total_rounds: u32,
    pub round_seconds: u32,
    pub decision_phase: bool,
    pub is_playing: bool,
    pub players: Vec<PlayerView>,
    /// The recipient's word for this round: the hint if they are the
    /// impostor, the secret word otherwise. This is the only channel through
    /// which a client learns its role-appropriate word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_word: Option<String>,
    pub server_now: String,
}

/// Outcome of a voting phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteResults {
    pub voted_out_id: PlayerId,
    pub impostor_id: PlayerId,
    pub impostor_detected: bool,
    /// Votes received per target.
    pub counts: HashMap<PlayerId, u32>,
}
