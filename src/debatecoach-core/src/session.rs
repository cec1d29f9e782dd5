//! Per-session state for coaching and debate simulation.
//!
//! Every piece of mutable state lives in a session object owned by the
//! caller. Sessions never share counters, history, or random state.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::error::CoachError;
use crate::fact_check::FactCheckResult;
use crate::participant::{Position, Speaker, Turn};

/// Opaque session key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything a [`SessionStore`] can hold.
pub trait Session {
    fn fresh() -> Self;
    fn id(&self) -> SessionId;
}

/// One debate against the simulated opponent.
#[derive(Debug, Clone)]
pub struct DebateSession {
    id: SessionId,
    round_count: u32,
    started_at: Instant,
    surrendered: bool,
    history: Vec<Turn>,
}

impl DebateSession {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// A session whose clock started at `started_at`.
    pub fn started_at(started_at: Instant) -> Self {
        Self {
            id: SessionId::new(),
            round_count: 0,
            started_at,
            surrendered: false,
            history: Vec::new(),
        }
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn is_surrendered(&self) -> bool {
        self.surrendered
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Count a new round and record the user's turn.
    pub fn accept_user_turn(&mut self, text: &str) -> Result<u32, CoachError> {
        if self.surrendered {
            return Err(CoachError::SessionSurrendered);
        }
        self.round_count += 1;
        self.history.push(Turn::user(text));
        Ok(self.round_count)
    }

    pub fn record_opponent_turn(&mut self, text: &str) {
        self.history.push(Turn::opponent(text));
    }

    /// One-way.
    pub fn mark_surrendered(&mut self) {
        self.surrendered = true;
    }
}

impl Default for DebateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for DebateSession {
    fn fresh() -> Self {
        Self::new()
    }

    fn id(&self) -> SessionId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingPhase {
    TopicSelection,
    Coaching,
}

/// Argument built up across coaching submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentProgress {
    pub claim: Option<String>,
    pub evidence: Vec<String>,
    pub reinforcement: Vec<String>,
}

impl ArgumentProgress {
    /// Claim, evidence and reinforcement steps completed so far, out of 3.
    pub fn completed_steps(&self) -> usize {
        usize::from(self.claim.is_some())
            + usize::from(!self.evidence.is_empty())
            + usize::from(!self.reinforcement.is_empty())
    }
}

/// One student's coaching conversation.
#[derive(Debug, Clone, Serialize)]
pub struct CoachingSession {
    id: SessionId,
    pub topic: Option<String>,
    pub position: Option<Position>,
    pub phase: CoachingPhase,
    pub progress: ArgumentProgress,
    pub transcript: Vec<Turn>,
    pub fact_checks: Vec<FactCheckResult>,
}

impl CoachingSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            topic: None,
            position: None,
            phase: CoachingPhase::TopicSelection,
            progress: ArgumentProgress::default(),
            transcript: Vec::new(),
            fact_checks: Vec::new(),
        }
    }

    pub fn is_coaching(&self) -> bool {
        self.phase == CoachingPhase::Coaching
    }

    /// Student messages in the transcript.
    pub fn submissions(&self) -> impl Iterator<Item = &Turn> {
        self.transcript
            .iter()
            .filter(|turn| turn.speaker == Speaker::User)
    }
}

impl Default for CoachingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for CoachingSession {
    fn fresh() -> Self {
        Self::new()
    }

    fn id(&self) -> SessionId {
        self.id
    }
}

/// Sessions keyed by id, one record per key.
#[derive(Debug)]
pub struct SessionStore<S> {
    sessions: HashMap<SessionId, S>,
}

impl<S: Session> SessionStore<S> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self) -> SessionId {
        let session = S::fresh();
        let id = session.id();
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Result<&S, CoachError> {
        self.sessions.get(&id).ok_or(CoachError::SessionNotFound(id))
    }

    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut S, CoachError> {
        self.sessions
            .get_mut(&id)
            .ok_or(CoachError::SessionNotFound(id))
    }

    /// Discard a session and replace it with a fresh one under a new id.
    pub fn restart(&mut self, id: SessionId) -> Result<SessionId, CoachError> {
        self.remove(id)?;
        Ok(self.create())
    }

    pub fn remove(&mut self, id: SessionId) -> Result<S, CoachError> {
        self.sessions
            .remove(&id)
            .ok_or(CoachError::SessionNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<S: Session> Default for SessionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debate_session_counts_rounds() {
        let mut session = DebateSession::new();
        assert_eq!(session.accept_user_turn("첫 발언").unwrap(), 1);
        session.record_opponent_turn("반론");
        assert_eq!(session.accept_user_turn("두 번째 발언").unwrap(), 2);

        assert_eq!(session.round_count(), 2);
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[1].speaker, Speaker::Opponent);
    }

    #[test]
    fn test_surrendered_session_rejects_turns() {
        let mut session = DebateSession::new();
        session.accept_user_turn("발언").unwrap();
        session.mark_surrendered();

        assert!(matches!(
            session.accept_user_turn("또 발언"),
            Err(CoachError::SessionSurrendered)
        ));
        assert_eq!(session.round_count(), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_elapsed_uses_start_instant() {
        let start = Instant::now() - Duration::from_secs(120);
        let session = DebateSession::started_at(start);
        assert!(session.elapsed() >= Duration::from_secs(120));
    }

    #[test]
    fn test_store_isolates_sessions() {
        let mut store: SessionStore<DebateSession> = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);

        store.get_mut(a).unwrap().accept_user_turn("A의 발언").unwrap();
        assert_eq!(store.get(a).unwrap().round_count(), 1);
        assert_eq!(store.get(b).unwrap().round_count(), 0);
    }

    #[test]
    fn test_store_restart_issues_new_id() {
        let mut store: SessionStore<DebateSession> = SessionStore::new();
        let old = store.create();
        store.get_mut(old).unwrap().mark_surrendered();

        let new = store.restart(old).unwrap();
        assert_ne!(old, new);
        assert!(matches!(store.get(old), Err(CoachError::SessionNotFound(id)) if id == old));
        assert!(!store.get(new).unwrap().is_surrendered());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_new_coaching_session() {
        let session = CoachingSession::new();
        assert_eq!(session.phase, CoachingPhase::TopicSelection);
        assert_eq!(session.progress, ArgumentProgress::default());
        assert!(!session.is_coaching());
        assert_eq!(session.submissions().count(), 0);
    }
}
