//! Round-phase operations: associations, decisions, votes, and the tally.

use super::Game;
use crate::error::GameError;
use crate::protocol::VoteResults;
use crate::types::*;
use std::collections::HashMap;

impl Game {
    /// Record a player's association. Returns true once every non-host
    /// player has submitted, which is the caller's cue to schedule the
    /// advance to the next phase.
    pub fn submit_association(&mut self, player_id: &str, text: String) -> Result<bool, GameError> {
        if self.phase != GamePhase::Collecting {
            return Err(GameError::WrongPhase);
        }
        let player = self.player_mut(player_id).ok_or(GameError::UnknownPlayer)?;
        if player.is_host {
            // The host has no word and does not play rounds.
            return Err(GameError::WrongPhase);
        }
        player.submission = Some(text);
        Ok(self.all_submitted())
    }

    /// True once every non-host player has submitted. Vacuously true with
    /// no non-host players, so callers must check that some remain.
    pub fn all_submitted(&self) -> bool {
        self.players
            .iter()
            .filter(|p| !p.is_host)
            .all(|p| p.submission.is_some())
    }

    pub fn begin_decision_phase(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Collecting {
            return Err(GameError::WrongPhase);
        }
        self.phase = GamePhase::Deciding;
        Ok(())
    }

    /// Record a player's decision. Returns true once every non-host player
    /// has decided.
    pub fn submit_decision(&mut self, player_id: &str, decision: bool) -> Result<bool, GameError> {
        if self.phase != GamePhase::Deciding {
            return Err(GameError::WrongPhase);
        }
        let player = self.player_mut(player_id).ok_or(GameError::UnknownPlayer)?;
        if player.is_host {
            return Err(GameError::WrongPhase);
        }
        player.decision = Some(decision);
        Ok(self.all_decided())
    }

    pub fn all_decided(&self) -> bool {
        self.players
            .iter()
            .filter(|p| !p.is_host)
            .all(|p| p.decision.is_some())
    }

    pub fn begin_voting(&mut self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Collecting | GamePhase::Deciding => {}
            _ => return Err(GameError::WrongPhase),
        }
        self.votes.clear();
        self.phase = GamePhase::Voting;
        Ok(())
    }

    /// Record a vote; a revote from the same voter overwrites in place, so
    /// the last vote wins without disturbing the tally order. Returns true
    /// once every non-host player has voted.
    pub fn submit_vote(&mut self, voter_id: &str, target_id: &str) -> Result<bool, GameError> {
        if self.phase != GamePhase::Voting {
            return Err(GameError::WrongPhase);
        }
        match self.player(voter_id) {
            Some(p) if !p.is_host => {}
            Some(_) => return Err(GameError::WrongPhase),
            None => return Err(GameError::UnknownPlayer),
        }
        if self.player(target_id).is_none() {
            return Err(GameError::UnknownPlayer);
        }
        if let Some(slot) = self.votes.iter_mut().find(|(voter, _)| voter == voter_id) {
            slot.1 = target_id.to_string();
        } else {
            self.votes.push((voter_id.to_string(), target_id.to_string()));
        }
        Ok(self.all_voted())
    }

    pub fn all_voted(&self) -> bool {
        self.players
            .iter()
            .filter(|p| !p.is_host)
            .all(|p| self.votes.iter().any(|(voter, _)| *voter == p.id))
    }

    /// Count the votes, apply scoring, and move to REVEALED.
    ///
    /// Tie-break: the first target to reach the maximum count while walking
    /// the votes in cast order wins (first-seen max, not last-seen).
    pub fn tally_votes(&mut self) -> Result<VoteResults, GameError> {
        if self.phase != GamePhase::Voting {
            return Err(GameError::WrongPhase);
        }

        let mut counts: HashMap<PlayerId, u32> = HashMap::new();
        let mut voted_out: Option<PlayerId> = None;
        let mut best = 0u32;
        for (_, target) in &self.votes {
            let count = counts.entry(target.clone()).or_insert(0);
            *count += 1;
            if *count > best {
                best = *count;
                voted_out = Some(target.clone());
            }
        }

        let impostor_id = self
            .impostor()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        let voted_out_id = voted_out.unwrap_or_default();
        let impostor_detected = !impostor_id.is_empty() && voted_out_id == impostor_id;

        if impostor_detected {
            for p in self
                .players
                .iter_mut()
                .filter(|p| !p.is_host && p.role == PlayerRole::Regular)
            {
                p.score += 10;
            }
        } else if let Some(p) = self
            .players
            .iter_mut()
            .find(|p| p.role == PlayerRole::Impostor)
        {
            p.score += 20;
        }

        self.phase = GamePhase::Revealed;
        Ok(VoteResults {
            voted_out_id,
            impostor_id,
            impostor_detected,
            counts,
        })
    }
}
