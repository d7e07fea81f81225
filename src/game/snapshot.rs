//! Per-player redaction of the full game state.

use super::Game;
use crate::protocol::{GameStateView, PlayerView};
use crate::types::{GamePhase, PlayerRole};

impl Game {
    /// Project the snapshot broadcast to clients.
    ///
    /// The redaction rules are the whole point here:
    /// - `is_impostor` is only ever true while a round is in flight, so the
    ///   role never leaks through post-game or lobby snapshots;
    /// - association texts stay hidden until the voting phase, before that
    ///   only `has_submitted` is visible;
    /// - `player_word` resolves to the hint for the impostor and the secret
    ///   word for everyone else, and only when `for_player` is given.
    pub fn snapshot(&self, for_player: Option<&str>) -> GameStateView {
        let playing = self.phase.is_playing();
        let reveal_associations =
            matches!(self.phase, GamePhase::Voting | GamePhase::Revealed);

        let players = self
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                is_host: p.is_host,
                is_impostor: playing && p.role == PlayerRole::Impostor,
                has_submitted: p.submission.is_some(),
                has_decided: p.decision.is_some(),
                association: if reveal_associations {
                    p.submission.clone()
                } else {
                    None
                },
            })
            .collect();

        let player_word = if playing {
            for_player.and_then(|id| self.player(id)).map(|p| {
                if p.role == PlayerRole::Impostor {
                    self.hint.clone()
                } else {
                    self.word.clone()
                }
            })
        } else {
            None
        };

        GameStateView {
            code: self.code.clone(),
            phase: self.phase,
            round_no: self.round_no,
            total_rounds: self.config.total_rounds,
            round_seconds: self.config.round_seconds,
            decision_phase: self.config.decision_phase,
            is_playing: playing,
            players,
            player_word,
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{lobby_game, started_game};
    use crate::types::GamePhase;

    #[test]
    fn test_impostor_sees_hint_others_see_word() {
        let game = started_game(2, "p1");

        let impostor_view = game.snapshot(Some("p1"));
        let regular_view = game.snapshot(Some("p2"));

        assert_eq!(impostor_view.player_word.as_deref(), Some(game.hint.as_str()));
        assert_eq!(regular_view.player_word.as_deref(), Some(game.word.as_str()));
    }

    #[test]
    fn test_no_player_word_without_recipient_or_round() {
        let game = started_game(2, "p1");
        assert!(game.snapshot(None).player_word.is_none());

        let lobby = lobby_game(2);
        assert!(lobby.snapshot(Some("p1")).player_word.is_none());
    }

    #[test]
    fn test_associations_hidden_while_collecting() {
        let mut game = started_game(2, "p1");
        game.submit_association("p1", "secret clue".to_string()).unwrap();

        let view = game.snapshot(Some("p2"));
        let p1 = view.players.iter().find(|p| p.id == "p1").unwrap();
        assert!(p1.has_submitted);
        assert!(p1.association.is_none());
    }

    #[test]
    fn test_associations_visible_from_voting() {
        let mut game = started_game(2, "p1");
        game.submit_association("p1", "secret clue".to_string()).unwrap();
        game.submit_association("p2", "other clue".to_string()).unwrap();
        game.begin_voting().unwrap();

        let view = game.snapshot(Some("p2"));
        let p1 = view.players.iter().find(|p| p.id == "p1").unwrap();
        assert_eq!(p1.association.as_deref(), Some("secret clue"));
    }

    #[test]
    fn test_impostor_flag_only_while_playing() {
        let mut game = started_game(2, "p1");

        let view = game.snapshot(None);
        assert!(view.players.iter().any(|p| p.is_impostor && p.id == "p1"));

        game.phase = GamePhase::GameOver;
        let view = game.snapshot(None);
        assert!(view.players.iter().all(|p| !p.is_impostor));
        assert!(!view.is_playing);
    }

    #[test]
    fn test_host_is_never_impostor_in_view() {
        for _ in 0..10 {
            let mut game = lobby_game(3);
            game.start_game("host").unwrap();
            let view = game.snapshot(None);
            assert!(view
                .players
                .iter()
                .all(|p| !(p.is_host && p.is_impostor)));
        }
    }
}
