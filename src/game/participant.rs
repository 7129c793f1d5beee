//! Participant identity and team types.
//!
//! A participant is one player seated in one session. Its identity and
//! display data never change after creation; only the team tag is assigned,
//! once, when teams are formed at game start.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a player, as supplied by the surrounding platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team tag meaning "not on any team yet".
pub const UNASSIGNED_TEAM: u32 = 0;

/// A player seated in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    id: ParticipantId,
    display_name: String,
    image_ref: Option<String>,
    team: u32,
}

impl Participant {
    /// Creates an unassigned participant.
    pub fn new(id: ParticipantId, display_name: impl Into<String>, image_ref: Option<String>) -> Self {
        Participant {
            id,
            display_name: display_name.into(),
            image_ref,
            team: UNASSIGNED_TEAM,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Team tag, `UNASSIGNED_TEAM` until teams are formed.
    pub fn team(&self) -> u32 {
        self.team
    }

    pub(crate) fn set_team(&mut self, team: u32) {
        self.team = team;
    }
}

/// Rendered into event text in place of a tribute placeholder.
impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// A fillable identity offered to roster finalization, e.g. a room member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: ParticipantId,
    pub display_name: String,
    pub image_ref: Option<String>,
}

impl Candidate {
    pub fn new(id: ParticipantId, display_name: impl Into<String>, image_ref: Option<String>) -> Self {
        Candidate {
            id,
            display_name: display_name.into(),
            image_ref,
        }
    }
}

impl From<(ParticipantId, String, Option<String>)> for Candidate {
    fn from((id, display_name, image_ref): (ParticipantId, String, Option<String>)) -> Self {
        Candidate {
            id,
            display_name,
            image_ref,
        }
    }
}

impl From<Candidate> for Participant {
    fn from(c: Candidate) -> Self {
        Participant::new(c.id, c.display_name, c.image_ref)
    }
}

/// A group of participants sharing a team tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub tag: u32,
    pub members: Vec<ParticipantId>,
}

impl Team {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }
}
