//! The session aggregate.
//!
//! A session is created for one room, collects enrollments until it is
//! started, and from then on only moves forward one phase per `advance`.
//! Each advance plays out the current phase (the bloodbath first) and then
//! ticks the clock, so the bloodbath is resolved exactly once.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::clock::{PhaseClock, PhaseLabel};
use super::error::GameError;
use super::participant::{Candidate, Participant, ParticipantId, Team};
use super::roster::RosterManager;
use crate::content::ContentPool;
use crate::events::{EventResolver, Resolution};

/// Result of one `advance`: the resolved phase plus where the clock landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub resolution: Resolution,
    pub next_phase: PhaseLabel,
    pub next_day: u32,
}

/// Read-only copy of a session's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub room: String,
    pub creator: ParticipantId,
    pub max_players: usize,
    pub started: bool,
    pub day: u32,
    pub is_daytime: bool,
    pub phase: PhaseLabel,
    pub roster: Vec<Participant>,
    pub teams: Vec<Team>,
}

/// One game in one room.
#[derive(Debug, Clone)]
pub struct GameSession {
    creator: ParticipantId,
    room: String,
    clock: PhaseClock,
    roster: RosterManager,
}

impl GameSession {
    /// Creates a session on the bloodbath, not yet started.
    pub fn create(
        creator: ParticipantId,
        room: impl Into<String>,
        max_players: usize,
    ) -> Result<Self, GameError> {
        let roster = RosterManager::new(max_players)?;
        let room = room.into();
        info!(room = %room, creator = %creator, max_players, "created session");
        Ok(GameSession {
            creator,
            room,
            clock: PhaseClock::new(),
            roster,
        })
    }

    pub fn creator(&self) -> ParticipantId {
        self.creator
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn is_started(&self) -> bool {
        self.roster.is_started()
    }

    pub fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    pub fn current_phase(&self) -> PhaseLabel {
        self.clock.current_phase()
    }

    pub fn participants(&self) -> &[Participant] {
        self.roster.participants()
    }

    pub fn teams(&self) -> &[Team] {
        self.roster.teams()
    }

    /// Seats a participant. Only legal before the start.
    pub fn enroll(&mut self, participant: Participant) -> Result<&Participant, GameError> {
        self.roster.enroll(participant)
    }

    /// Fills vacancies from `candidates`, locks the roster and forms teams.
    ///
    /// Either every step happens or none does.
    pub fn start<I, C>(
        &mut self,
        candidates: I,
        team_size: usize,
        rng: &mut impl Rng,
    ) -> Result<&[Team], GameError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        if team_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "team size must be positive".to_string(),
            ));
        }
        let added = self.roster.finalize_roster(candidates, rng)?;
        self.roster.form_teams(team_size, rng)?;
        info!(
            room = %self.room,
            players = self.roster.len(),
            filled = added.len(),
            teams = self.roster.teams().len(),
            "started session"
        );
        Ok(self.roster.teams())
    }

    /// Resolves the current phase and moves the clock to the next one.
    pub fn advance(
        &mut self,
        resolver: &EventResolver,
        pool: &ContentPool,
        rng: &mut impl Rng,
    ) -> Result<AdvanceOutcome, GameError> {
        if !self.is_started() {
            return Err(GameError::InvalidState("the game has not started"));
        }
        let resolution = resolver.resolve(
            self.clock.current_phase(),
            self.clock.day(),
            self.roster.participants(),
            pool,
            rng,
        );
        let next_phase = self.clock.advance();
        debug!(
            room = %self.room,
            resolved = %resolution.phase,
            next = %next_phase,
            day = self.clock.day(),
            "advanced session"
        );
        Ok(AdvanceOutcome {
            resolution,
            next_phase,
            next_day: self.clock.day(),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            room: self.room.clone(),
            creator: self.creator,
            max_players: self.roster.max_players(),
            started: self.roster.is_started(),
            day: self.clock.day(),
            is_daytime: self.clock.is_daytime(),
            phase: self.clock.current_phase(),
            roster: self.roster.participants().to_vec(),
            teams: self.roster.teams().to_vec(),
        }
    }
}
