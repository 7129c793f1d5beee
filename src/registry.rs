//! Room-keyed session registry.
//!
//! Holds one session per room behind its own mutex, so calls for the same
//! room serialize while different rooms proceed independently. The only
//! state shared between sessions is the read-only content pool.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::content::ContentPool;
use crate::events::EventResolver;
use crate::game::{
    AdvanceOutcome, Candidate, GameError, GameSession, Participant, ParticipantId, SessionSnapshot,
    Team,
};

/// Exclusive-access handle to one session.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// The session API a command layer drives.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    pool: Arc<ContentPool>,
    resolver: EventResolver,
    team_size: usize,
}

impl SessionRegistry {
    /// Creates an empty registry using `config`'s curves and team size.
    pub fn new(pool: Arc<ContentPool>, config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        Ok(SessionRegistry {
            sessions: RwLock::new(HashMap::new()),
            pool,
            resolver: config.resolver()?,
            team_size: config.team_size,
        })
    }

    pub fn pool(&self) -> &Arc<ContentPool> {
        &self.pool
    }

    /// Returns the handle for `room`, if a game exists there.
    pub fn get(&self, room: &str) -> Option<SessionHandle> {
        self.sessions.read().get(room).cloned()
    }

    fn handle(&self, room: &str) -> Result<SessionHandle, GameError> {
        self.get(room)
            .ok_or_else(|| GameError::SessionNotFound(room.to_string()))
    }

    /// Rooms with a game, sorted.
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.sessions.read().keys().cloned().collect();
        rooms.sort();
        rooms
    }

    pub fn create_session(
        &self,
        creator: ParticipantId,
        room: &str,
        max_players: usize,
    ) -> Result<SessionHandle, GameError> {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(room) {
            return Err(GameError::SessionExists(room.to_string()));
        }
        let handle = Arc::new(Mutex::new(GameSession::create(creator, room, max_players)?));
        sessions.insert(room.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    pub fn enroll_participant(
        &self,
        room: &str,
        participant: Participant,
    ) -> Result<Participant, GameError> {
        let handle = self.handle(room)?;
        let mut session = handle.lock();
        session.enroll(participant).cloned()
    }

    pub fn start_session<I, C>(
        &self,
        room: &str,
        candidates: I,
        rng: &mut impl Rng,
    ) -> Result<Vec<Team>, GameError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        let handle = self.handle(room)?;
        let mut session = handle.lock();
        session
            .start(candidates, self.team_size, rng)
            .map(|teams| teams.to_vec())
    }

    pub fn advance_session(&self, room: &str, rng: &mut impl Rng) -> Result<AdvanceOutcome, GameError> {
        let handle = self.handle(room)?;
        let mut session = handle.lock();
        session.advance(&self.resolver, &self.pool, rng)
    }

    pub fn snapshot(&self, room: &str) -> Result<SessionSnapshot, GameError> {
        let handle = self.handle(room)?;
        let session = handle.lock();
        Ok(session.snapshot())
    }

    /// Removes the game in `room`, returning its final state.
    pub fn end_session(&self, room: &str) -> Result<SessionSnapshot, GameError> {
        let handle = self
            .sessions
            .write()
            .remove(room)
            .ok_or_else(|| GameError::SessionNotFound(room.to_string()))?;
        let snapshot = handle.lock().snapshot();
        info!(room, day = snapshot.day, "ended session");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(ContentPool::new()), &GameConfig::default()).unwrap()
    }

    fn members(n: u64) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(ParticipantId(i), format!("m{}", i), None))
            .collect()
    }

    #[test]
    fn one_game_per_room() {
        let registry = registry();
        registry.create_session(ParticipantId(1), "a", 4).unwrap();
        assert_eq!(
            registry.create_session(ParticipantId(2), "a", 4).err(),
            Some(GameError::SessionExists("a".to_string()))
        );
        registry.create_session(ParticipantId(2), "b", 4).unwrap();
        assert_eq!(registry.rooms(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn unknown_room_is_reported() {
        let registry = registry();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            registry.advance_session("nowhere", &mut rng).unwrap_err(),
            GameError::SessionNotFound("nowhere".to_string())
        );
        assert!(registry.snapshot("nowhere").is_err());
        assert!(registry.end_session("nowhere").is_err());
    }

    #[test]
    fn full_lifecycle() {
        let registry = registry();
        let mut rng = SmallRng::seed_from_u64(5);
        registry.create_session(ParticipantId(1), "room", 4).unwrap();
        registry
            .enroll_participant("room", Participant::new(ParticipantId(1), "Alice", None))
            .unwrap();
        let teams = registry.start_session("room", members(10), &mut rng).unwrap();
        assert_eq!(teams.len(), 2);

        let outcome = registry.advance_session("room", &mut rng).unwrap();
        assert!(outcome.resolution.event.is_none());
        assert_eq!(registry.snapshot("room").unwrap().day, 0);

        let ended = registry.end_session("room").unwrap();
        assert_eq!(ended.roster.len(), 4);
        assert!(registry.get("room").is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            team_size: 0,
            ..Default::default()
        };
        assert!(SessionRegistry::new(Arc::new(ContentPool::new()), &config).is_err());
    }
}
