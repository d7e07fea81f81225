//! Room registry: maps room codes to live games.
//!
//! The registry is the only shared collection in the process. Each room owns
//! its game behind a lock, so rooms stay fully independent; mutations within
//! one room never interleave.

use crate::error::GameError;
use crate::game::Game;
use crate::protocol::VoteResults;
use crate::types::{GameConfig, GamePhase, PlayerId, RoomCode};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

/// Room code alphabet and length.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 6;

/// How long an ended room stays around for late state fetches.
const DISPOSAL_GRACE: Duration = Duration::from_secs(60);

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Room-scoped fan-out event. Carries a clone of the full game so every
/// connection can project its own redacted view before serializing.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    PlayerJoined { game: Game },
    GameStarted { game: Game },
    AssociationSubmitted { game: Game },
    DecisionStarted { game: Game },
    DecisionSubmitted { game: Game },
    VotingStarted { game: Game },
    VoteSubmitted { game: Game },
    VoteResults { results: VoteResults, game: Game },
    NextRoundStarted { game: Game },
    GameEnded { game: Game },
    GameRestarted { game: Game },
    PlayerLeft { game: Game },
    HostDisconnected,
}

/// One live room: the game plus its broadcast channel.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub game: RwLock<Game>,
    pub events: broadcast::Sender<RoomEvent>,
}

pub struct Registry {
    rooms: RwLock<HashMap<RoomCode, Arc<Room>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Create a room with the caller joined as host. Retries code
    /// generation on collision until unique among active rooms.
    pub async fn create_room(
        &self,
        host_id: PlayerId,
        host_name: &str,
        config: GameConfig,
    ) -> Result<Arc<Room>, GameError> {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let game = Game::new(code.clone(), host_id, host_name, config)?;
        let (tx, _rx) = broadcast::channel(64);
        let room = Arc::new(Room {
            code: code.clone(),
            game: RwLock::new(game),
            events: tx,
        });
        rooms.insert(code.clone(), room.clone());
        tracing::info!("Created room {}", code);
        Ok(room)
    }

    /// Look up a room by code. Malformed codes are rejected before the
    /// lookup so callers can tell a typo from a vanished room.
    pub async fn get(&self, code: &str) -> Result<Arc<Room>, GameError> {
        if code.len() != CODE_LENGTH
            || !code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(GameError::InvalidCode);
        }
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or(GameError::RoomNotFound)
    }

    /// Remove a room immediately (host left, or everyone gone).
    pub async fn remove(&self, code: &str) -> Option<Arc<Room>> {
        let removed = self.rooms.write().await.remove(code);
        if removed.is_some() {
            tracing::info!("Removed room {}", code);
        }
        removed
    }

    /// Schedule removal after the post-game grace period. The deferred
    /// callback re-checks that the room still exists and is still ended, so
    /// a restart during the grace period keeps the room alive.
    pub fn schedule_disposal(self: &Arc<Self>, code: RoomCode) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(DISPOSAL_GRACE).await;
            let room = match registry.get(&code).await {
                Ok(room) => room,
                Err(_) => return,
            };
            let still_over = room.game.read().await.phase == GamePhase::GameOver;
            if still_over {
                registry.remove(&code).await;
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_format() {
        for _ in 0..50 {
            let code = generate_room_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_create_and_get_room() {
        let registry = Registry::new();
        let room = registry
            .create_room("host".to_string(), "Hosty", GameConfig::default())
            .await
            .unwrap();

        let found = registry.get(&room.code).await.unwrap();
        assert_eq!(found.code, room.code);
        assert_eq!(registry.len().await, 1);

        let game = found.game.read().await;
        assert_eq!(game.host_id, "host");
        assert_eq!(game.players.len(), 1);
        assert!(game.players[0].is_host);
    }

    #[tokio::test]
    async fn test_codes_are_unique() {
        let registry = Registry::new();
        let mut codes = std::collections::HashSet::new();
        for i in 0..20 {
            let room = registry
                .create_room(format!("host{i}"), "Host", GameConfig::default())
                .await
                .unwrap();
            assert!(codes.insert(room.code.clone()));
        }
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_code() {
        let registry = Registry::new();
        assert_eq!(
            registry.get("abc").await.unwrap_err(),
            GameError::InvalidCode
        );
        assert_eq!(
            registry.get("abcdef").await.unwrap_err(),
            GameError::InvalidCode
        );
        assert_eq!(
            registry.get("ZZZZZ9").await.unwrap_err(),
            GameError::RoomNotFound
        );
    }

    #[tokio::test]
    async fn test_create_room_rejects_empty_host_name() {
        let registry = Registry::new();
        let result = registry
            .create_room("host".to_string(), " ", GameConfig::default())
            .await;
        assert!(matches!(result, Err(GameError::EmptyName)));
        assert!(registry.is_empty().await);
    }

    // Disposal timing runs on tokio's paused clock so the grace period
    // elapses virtually.

    #[tokio::test(start_paused = true)]
    async fn test_ended_room_disposed_after_grace_period() {
        let registry = Arc::new(Registry::new());
        let room = registry
            .create_room("host".to_string(), "Hosty", GameConfig::default())
            .await
            .unwrap();
        room.game.write().await.phase = GamePhase::GameOver;
        registry.schedule_disposal(room.code.clone());

        tokio::time::sleep(DISPOSAL_GRACE + Duration::from_secs(1)).await;
        assert_eq!(
            registry.get(&room.code).await.unwrap_err(),
            GameError::RoomNotFound
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_during_grace_period_keeps_room() {
        let registry = Arc::new(Registry::new());
        let room = registry
            .create_room("host".to_string(), "Hosty", GameConfig::default())
            .await
            .unwrap();
        room.game.write().await.phase = GamePhase::GameOver;
        registry.schedule_disposal(room.code.clone());

        // A restart mid-grace puts the room back in the lobby; the pending
        // disposal must leave it alone.
        tokio::time::sleep(Duration::from_secs(1)).await;
        room.game.write().await.phase = GamePhase::Lobby;

        tokio::time::sleep(DISPOSAL_GRACE + Duration::from_secs(1)).await;
        assert!(registry.get(&room.code).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_room() {
        let registry = Registry::new();
        let room = registry
            .create_room("host".to_string(), "Hosty", GameConfig::default())
            .await
            .unwrap();

        assert!(registry.remove(&room.code).await.is_some());
        assert_eq!(
            registry.get(&room.code).await.unwrap_err(),
            GameError::RoomNotFound
        );
    }
}
