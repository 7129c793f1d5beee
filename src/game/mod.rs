//! Session state: participants, the phase clock, the roster and the
//! session aggregate that ties them together.

pub mod clock;
pub mod error;
pub mod participant;
pub mod roster;
pub mod session;

pub use clock::{PhaseClock, PhaseLabel};
pub use error::GameError;
pub use participant::{Candidate, Participant, ParticipantId, Team, UNASSIGNED_TEAM};
pub use roster::RosterManager;
pub use session::{AdvanceOutcome, GameSession, SessionSnapshot};
