//! Command dispatch.
//!
//! Holds the session registry, the members seen in each room (the pool
//! empty seats are filled from), the game configuration, and the random
//! generator threaded through every roll. Each command writes its reply
//! lines to the supplied writer.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::warn;

use crate::config::GameConfig;
use crate::content::ContentPool;
use crate::events::Resolution;
use crate::game::{Candidate, GameError, Participant};
use crate::protocol::Command;
use crate::registry::SessionRegistry;

/// Holds the mutable state of the front end between commands.
pub struct Engine {
    registry: SessionRegistry,
    members: HashMap<String, Vec<Candidate>>,
    config: GameConfig,
    rng: SmallRng,
}

impl Engine {
    /// Creates an engine over `pool`. A `seed` of 0 draws from entropy.
    pub fn new(pool: Arc<ContentPool>, config: GameConfig, seed: u64) -> Result<Self, GameError> {
        let registry = SessionRegistry::new(pool, &config)?;
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        Ok(Engine {
            registry,
            members: HashMap::new(),
            config,
            rng,
        })
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Runs one command and writes its reply. `Quit` is left to the caller.
    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        let reply = match cmd {
            Command::NewGame {
                room,
                creator,
                max_players,
            } => {
                let max = max_players.unwrap_or(self.config.default_max_players);
                self.registry
                    .create_session(creator, &room, max)
                    .map(|_| vec![format!("ok newgame {} max {}", room, max)])
            }
            Command::Join { room, member } => self.handle_join(room, member),
            Command::Volunteer { room, volunteer } => self
                .registry
                .enroll_participant(&room, Participant::from(volunteer))
                .map(|p| vec![format!("ok volunteer {} {} {}", room, p.id(), p.display_name())]),
            Command::StartGame { room } => self.handle_start(&room),
            Command::Continue { room } => self
                .registry
                .advance_session(&room, &mut self.rng)
                .map(|outcome| vec![format_resolution(&outcome.resolution)]),
            Command::Players { room } => self.handle_players(&room),
            Command::Snapshot { room } => self.registry.snapshot(&room).map(|snapshot| {
                let json = serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
                vec![format!("snapshot {}", json)]
            }),
            Command::EndGame { room } => {
                self.members.remove(&room);
                self.registry
                    .end_session(&room)
                    .map(|snapshot| vec![format!("ok endgame {} day {}", room, snapshot.day)])
            }
            Command::Quit => Ok(Vec::new()),
        };

        match reply {
            Ok(lines) => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            Err(e) => {
                warn!("command rejected: {}", e);
                writeln!(out, "error {}", e)?;
            }
        }
        out.flush()
    }

    /// Records a member of a room that has a game; repeats of the same id
    /// are ignored.
    fn handle_join(&mut self, room: String, member: Candidate) -> Result<Vec<String>, GameError> {
        if self.registry.get(&room).is_none() {
            return Err(GameError::SessionNotFound(room));
        }
        let reply = format!("ok join {} {}", room, member.id);
        let members = self.members.entry(room).or_default();
        if !members.iter().any(|m| m.id == member.id) {
            members.push(member);
        }
        Ok(vec![reply])
    }

    fn handle_start(&mut self, room: &str) -> Result<Vec<String>, GameError> {
        let candidates = self.members.get(room).cloned().unwrap_or_default();
        let teams = self.registry.start_session(room, candidates, &mut self.rng)?;
        let snapshot = self.registry.snapshot(room)?;

        let mut lines = Vec::with_capacity(teams.len() + 1);
        lines.push(format!(
            "ok startgame {} players {} teams {}",
            room,
            snapshot.roster.len(),
            teams.len()
        ));
        for team in &teams {
            let names: Vec<&str> = team
                .members
                .iter()
                .filter_map(|id| snapshot.roster.iter().find(|p| p.id() == *id))
                .map(Participant::display_name)
                .collect();
            lines.push(format!("team {}: {}", team.tag, names.join(", ")));
        }
        Ok(lines)
    }

    fn handle_players(&self, room: &str) -> Result<Vec<String>, GameError> {
        let snapshot = self.registry.snapshot(room)?;
        let mut lines: Vec<String> = snapshot
            .roster
            .iter()
            .map(|p| format!("Name: {}, ID: {}", p.display_name(), p.id()))
            .collect();
        lines.push(format!("ok players {} {}", room, snapshot.roster.len()));
        Ok(lines)
    }
}

/// Formats a resolution as an `event` or `noevent` reply line.
pub fn format_resolution(resolution: &Resolution) -> String {
    match &resolution.event {
        Some(event) => {
            let mut line = format!(
                "event {} day {} {}",
                resolution.effective_phase, resolution.day, resolution.lethality
            );
            for field in &event.rendered_fields {
                line.push_str(" | ");
                line.push_str(field);
            }
            line
        }
        None => format!(
            "noevent {} day {}",
            resolution.effective_phase, resolution.day
        ),
    }
}
