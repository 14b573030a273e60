//! In-memory session store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::ScheduleStore;
use crate::error::{Result, SchedulingError};
use crate::models::DefenseSession;

/// Session store kept in memory, ordered by session id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<BTreeMap<String, DefenseSession>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with sessions.
    pub fn with_sessions(sessions: impl IntoIterator<Item = DefenseSession>) -> Self {
        Self {
            sessions: RwLock::new(sessions.into_iter().map(|s| (s.id.clone(), s)).collect()),
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn insert(&self, session: &DefenseSession) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|e| SchedulingError::Storage(e.to_string()))?;
        if sessions.contains_key(&session.id) {
            return Err(SchedulingError::Storage(format!("Session already exists: {}", session.id)));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn update(&self, session: &DefenseSession) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|e| SchedulingError::Storage(e.to_string()))?;
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(SchedulingError::SessionNotFound(session.id.clone())),
        }
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().map_err(|e| SchedulingError::Storage(e.to_string()))?;
        Ok(sessions.remove(id).is_some())
    }

    fn get(&self, id: &str) -> Result<Option<DefenseSession>> {
        let sessions = self.sessions.read().map_err(|e| SchedulingError::Storage(e.to_string()))?;
        Ok(sessions.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<DefenseSession>> {
        let sessions = self.sessions.read().map_err(|e| SchedulingError::Storage(e.to_string()))?;
        Ok(sessions.values().cloned().collect())
    }
}
