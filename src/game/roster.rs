//! Roster and team management.
//!
//! Owns the participant list of one session. Enforces capacity and identity
//! uniqueness, fills vacancies with distinct candidates when the game starts,
//! and partitions the finalized roster into teams exactly once.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::error::GameError;
use super::participant::{Candidate, Participant, ParticipantId, Team};

/// Participant list, capacity and team partition for one session.
#[derive(Debug, Clone)]
pub struct RosterManager {
    max_players: usize,
    started: bool,
    roster: Vec<Participant>,
    teams: Vec<Team>,
}

impl RosterManager {
    /// Creates an empty, unstarted roster. `max_players` must be positive.
    pub fn new(max_players: usize) -> Result<Self, GameError> {
        if max_players == 0 {
            return Err(GameError::InvalidConfiguration(
                "max players must be positive".to_string(),
            ));
        }
        Ok(RosterManager {
            max_players,
            started: false,
            roster: Vec::with_capacity(max_players),
            teams: Vec::new(),
        })
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn participants(&self) -> &[Participant] {
        &self.roster
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.roster.iter().any(|p| p.id() == id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id() == id)
    }

    /// Adds a participant before the game starts.
    pub fn enroll(&mut self, participant: Participant) -> Result<&Participant, GameError> {
        if self.started {
            return Err(GameError::InvalidState("cannot enroll after the game has started"));
        }
        if self.contains(participant.id()) {
            return Err(GameError::DuplicateParticipant(participant.id()));
        }
        if self.roster.len() == self.max_players {
            return Err(GameError::RosterFull {
                max_players: self.max_players,
            });
        }
        debug!(id = %participant.id(), name = participant.display_name(), "enrolled");
        self.roster.push(participant);
        Ok(&self.roster[self.roster.len() - 1])
    }

    /// Fills every empty seat with a distinct candidate and locks the roster.
    ///
    /// Candidates already enrolled, and repeats within `candidates`, are
    /// skipped. Fails without touching the roster when the remaining distinct
    /// candidates cannot cover the vacancies. Returns the ids that were added.
    pub fn finalize_roster<I, C>(
        &mut self,
        candidates: I,
        rng: &mut impl Rng,
    ) -> Result<Vec<ParticipantId>, GameError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        if self.started {
            return Err(GameError::InvalidState("roster is already finalized"));
        }

        let needed = self.max_players - self.roster.len();
        let mut added = Vec::with_capacity(needed);
        if needed > 0 {
            let mut seen: HashSet<ParticipantId> = self.roster.iter().map(|p| p.id()).collect();
            let eligible: Vec<Candidate> = candidates
                .into_iter()
                .map(Into::into)
                .filter(|c: &Candidate| seen.insert(c.id))
                .collect();
            if eligible.len() < needed {
                return Err(GameError::InsufficientCandidates {
                    needed,
                    available: eligible.len(),
                });
            }

            for candidate in eligible.choose_multiple(rng, needed) {
                added.push(candidate.id);
                self.roster.push(Participant::from(candidate.clone()));
            }
            debug!(filled = needed, "filled vacant seats");
        }

        self.started = true;
        Ok(added)
    }

    /// Partitions the finalized roster into teams of `team_size`.
    ///
    /// The roster is shuffled, cut into contiguous groups, and the group order
    /// shuffled again before tags `1..=n` are handed out. A short final group
    /// is kept as an undersized team.
    pub fn form_teams(&mut self, team_size: usize, rng: &mut impl Rng) -> Result<&[Team], GameError> {
        if team_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "team size must be positive".to_string(),
            ));
        }
        if !self.started {
            return Err(GameError::InvalidState("teams are formed after the roster is finalized"));
        }
        if !self.teams.is_empty() {
            return Err(GameError::InvalidState("teams have already been formed"));
        }

        let mut order: Vec<ParticipantId> = self.roster.iter().map(|p| p.id()).collect();
        order.shuffle(rng);
        let mut groups: Vec<Vec<ParticipantId>> =
            order.chunks(team_size).map(|chunk| chunk.to_vec()).collect();
        groups.shuffle(rng);

        self.teams = groups
            .into_iter()
            .enumerate()
            .map(|(i, members)| Team {
                tag: i as u32 + 1,
                members,
            })
            .collect();

        for team in &self.teams {
            for participant in self.roster.iter_mut() {
                if team.contains(participant.id()) {
                    participant.set_team(team.tag);
                }
            }
        }
        debug!(teams = self.teams.len(), team_size, "formed teams");
        Ok(&self.teams)
    }
}
