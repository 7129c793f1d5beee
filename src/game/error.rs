//! Session failures reported to callers.

use thiserror::Error;

use super::participant::ParticipantId;

/// Errors raised by session, roster and registry operations.
///
/// A failed operation never leaves a partial mutation behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("participant {0} is already enrolled")]
    DuplicateParticipant(ParticipantId),

    #[error("roster is full ({max_players} players)")]
    RosterFull { max_players: usize },

    #[error("not enough distinct candidates: need {needed}, have {available}")]
    InsufficientCandidates { needed: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("room {0} already has a game")]
    SessionExists(String),

    #[error("room {0} has no game")]
    SessionNotFound(String),
}
