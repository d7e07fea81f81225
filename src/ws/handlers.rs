//! Per-connection message dispatch.
//!
//! Every message except room creation/join requires the connection to be
//! associated with a room. Out-of-phase and unauthorized gameplay actions
//! are silently dropped (no reply), matching the room protocol's observable
//! behavior; creation, join, and start failures get explicit `error`
//! replies.

use crate::error::GameError;
use crate::game::{Removal, RoundAdvance};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{Registry, Room, RoomEvent};
use crate::types::{GameConfig, GamePhase};
use std::sync::Arc;
use std::time::Duration;

use super::Session;

/// Delay between the last submission/vote landing and the phase advance, so
/// clients can render the final entry before the screen changes.
const PHASE_ADVANCE_DELAY: Duration = Duration::from_millis(1000);

fn error_reply(err: GameError) -> ServerMessage {
    ServerMessage::Error {
        code: err.code().to_string(),
        msg: err.to_string(),
    }
}

/// Handle one client message, returning the direct reply for the caller (if
/// any). Room-wide effects go out through the room's broadcast channel.
pub async fn handle_message(
    registry: &Arc<Registry>,
    session: &mut Session,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            rounds_count,
            round_time_seconds,
            decision_phase,
        } => {
            if session.room.is_some() {
                // Already in a room; drop.
                return None;
            }
            let config = GameConfig {
                total_rounds: rounds_count.max(1),
                round_seconds: round_time_seconds,
                decision_phase,
            };
            match registry
                .create_room(session.player_id.clone(), &player_name, config)
                .await
            {
                Ok(room) => {
                    let state = room.game.read().await.snapshot(Some(&session.player_id));
                    let code = room.code.clone();
                    session.room = Some(room);
                    Some(ServerMessage::RoomCreated { code, state })
                }
                Err(e) => Some(error_reply(e)),
            }
        }

        ClientMessage::JoinRoom { code, player_name } => {
            if session.room.is_some() {
                return None;
            }
            let code = code.trim().to_ascii_uppercase();
            let room = match registry.get(&code).await {
                Ok(room) => room,
                Err(e) => return Some(error_reply(e)),
            };
            let result = {
                let mut game = room.game.write().await;
                game.add_player(session.player_id.clone(), &player_name)
            };
            match result {
                Ok(()) => {
                    let game = room.game.read().await.clone();
                    let _ = room.events.send(RoomEvent::PlayerJoined { game: game.clone() });
                    let state = game.snapshot(Some(&session.player_id));
                    session.room = Some(room);
                    tracing::info!("Player {} joined room {}", session.player_id, code);
                    Some(ServerMessage::Joined { state })
                }
                Err(e) => Some(error_reply(e)),
            }
        }

        ClientMessage::StartGame => {
            let room = session.room.as_ref()?;
            let result = room.game.write().await.start_game(&session.player_id);
            match result {
                Ok(()) => {
                    let game = room.game.read().await.clone();
                    tracing::info!("Room {} started with {} players", room.code, game.players.len());
                    let _ = room.events.send(RoomEvent::GameStarted { game });
                    None
                }
                Err(e) => Some(error_reply(e)),
            }
        }

        ClientMessage::SubmitAssociation { text } => {
            let room = session.room.as_ref()?;
            let result = room
                .game
                .write()
                .await
                .submit_association(&session.player_id, text);
            match result {
                Ok(all_submitted) => {
                    let game = room.game.read().await.clone();
                    let round_no = game.round_no;
                    let _ = room.events.send(RoomEvent::AssociationSubmitted { game });
                    if all_submitted {
                        schedule_collecting_advance(registry.clone(), room.clone(), round_no);
                    }
                    None
                }
                // Out-of-phase or host submission: silently dropped.
                Err(_) => None,
            }
        }

        ClientMessage::SubmitDecision { decision } => {
            let room = session.room.as_ref()?;
            let result = room
                .game
                .write()
                .await
                .submit_decision(&session.player_id, decision);
            match result {
                Ok(all_decided) => {
                    let game = room.game.read().await.clone();
                    let _ = room.events.send(RoomEvent::DecisionSubmitted { game });
                    if all_decided {
                        let voting = {
                            let mut game = room.game.write().await;
                            game.begin_voting().is_ok().then(|| game.clone())
                        };
                        if let Some(game) = voting {
                            let _ = room.events.send(RoomEvent::VotingStarted { game });
                        }
                    }
                    None
                }
                Err(_) => None,
            }
        }

        ClientMessage::SubmitVote { target_id } => {
            let room = session.room.as_ref()?;
            let result = room
                .game
                .write()
                .await
                .submit_vote(&session.player_id, &target_id);
            match result {
                Ok(all_voted) => {
                    let game = room.game.read().await.clone();
                    let round_no = game.round_no;
                    let _ = room.events.send(RoomEvent::VoteSubmitted { game });
                    if all_voted {
                        schedule_vote_reveal(registry.clone(), room.clone(), round_no);
                    }
                    None
                }
                Err(_) => None,
            }
        }

        ClientMessage::NextRound => {
            let room = session.room.as_ref()?;
            let result = room.game.write().await.next_round(&session.player_id);
            match result {
                Ok(RoundAdvance::Started) => {
                    let game = room.game.read().await.clone();
                    let _ = room.events.send(RoomEvent::NextRoundStarted { game });
                    None
                }
                Ok(RoundAdvance::GameOver) => {
                    let game = room.game.read().await.clone();
                    tracing::info!("Room {} finished all rounds", room.code);
                    let _ = room.events.send(RoomEvent::GameEnded { game });
                    registry.schedule_disposal(room.code.clone());
                    None
                }
                // Non-host or out-of-phase: silently dropped.
                Err(_) => None,
            }
        }

        ClientMessage::RestartGame => {
            let room = session.room.as_ref()?;
            let result = room.game.write().await.restart_game(&session.player_id);
            match result {
                Ok(()) => {
                    let game = room.game.read().await.clone();
                    let _ = room.events.send(RoomEvent::GameRestarted { game });
                    None
                }
                Err(_) => None,
            }
        }
    }
}

/// Implicit disconnect: the host leaving ends the room; anyone else leaving
/// just shrinks it (with impostor reassignment handled by the game).
pub async fn handle_disconnect(registry: &Arc<Registry>, session: &Session) {
    let Some(room) = &session.room else {
        return;
    };
    let removal = room.game.write().await.remove_player(&session.player_id);
    match removal {
        Removal::HostLeft => {
            registry.remove(&room.code).await;
            let _ = room.events.send(RoomEvent::HostDisconnected);
            tracing::info!("Host left, room {} disposed", room.code);
        }
        Removal::Left { .. } => {
            let game = room.game.read().await.clone();
            let _ = room.events.send(RoomEvent::PlayerLeft { game: game.clone() });
            // The leaver may have been the last one the phase was waiting
            // on; re-check the advance conditions for whoever remains. The
            // all_* checks are vacuously true on an empty set, so an empty
            // player roster must not trigger an advance.
            if !game.players.iter().any(|p| !p.is_host) {
                return;
            }
            match game.phase {
                GamePhase::Collecting if game.all_submitted() => {
                    schedule_collecting_advance(registry.clone(), room.clone(), game.round_no);
                }
                GamePhase::Deciding if game.all_decided() => {
                    let voting = {
                        let mut game = room.game.write().await;
                        game.begin_voting().is_ok().then(|| game.clone())
                    };
                    if let Some(game) = voting {
                        let _ = room.events.send(RoomEvent::VotingStarted { game });
                    }
                }
                GamePhase::Voting if game.all_voted() => {
                    schedule_vote_reveal(registry.clone(), room.clone(), game.round_no);
                }
                _ => {}
            }
        }
    }
}

/// After the last association lands, advance out of COLLECTING once the
/// delay elapses. The callback re-checks that the room still exists and the
/// round hasn't moved on, so it can never mutate a disposed or restarted
/// game.
fn schedule_collecting_advance(registry: Arc<Registry>, room: Arc<Room>, round_no: u32) {
    tokio::spawn(async move {
        tokio::time::sleep(PHASE_ADVANCE_DELAY).await;
        if registry.get(&room.code).await.is_err() {
            return;
        }
        let event = {
            let mut game = room.game.write().await;
            if game.round_no != round_no || game.phase != GamePhase::Collecting {
                return;
            }
            if game.config.decision_phase {
                if game.begin_decision_phase().is_err() {
                    return;
                }
                RoomEvent::DecisionStarted { game: game.clone() }
            } else {
                if game.begin_voting().is_err() {
                    return;
                }
                RoomEvent::VotingStarted { game: game.clone() }
            }
        };
        let _ = room.events.send(event);
    });
}

/// After the last vote lands, tally and reveal once the delay elapses, with
/// the same disposal/phase guards.
fn schedule_vote_reveal(registry: Arc<Registry>, room: Arc<Room>, round_no: u32) {
    tokio::spawn(async move {
        tokio::time::sleep(PHASE_ADVANCE_DELAY).await;
        if registry.get(&room.code).await.is_err() {
            return;
        }
        let event = {
            let mut game = room.game.write().await;
            if game.round_no != round_no || game.phase != GamePhase::Voting {
                return;
            }
            match game.tally_votes() {
                Ok(results) => RoomEvent::VoteResults {
                    results,
                    game: game.clone(),
                },
                Err(_) => return,
            }
        };
        let _ = room.events.send(event);
    });
}
