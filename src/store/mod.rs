//! Durable record of defense sessions.
//!
//! The store holds no scheduling logic. It persists exactly what is needed
//! to replay the occupancy ledger (project, date, window, room, persons)
//! and nothing derived.

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::DefenseSession;

/// Storage trait for defense sessions.
pub trait ScheduleStore: Send + Sync {
    /// Persist a new session. Fails if the id already exists.
    fn insert(&self, session: &DefenseSession) -> Result<()>;

    /// Replace an existing session. Fails if the id does not exist.
    fn update(&self, session: &DefenseSession) -> Result<()>;

    /// Delete a session by id. Returns `false` if it did not exist.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Get a session by id.
    fn get(&self, id: &str) -> Result<Option<DefenseSession>>;

    /// List all sessions.
    fn list(&self) -> Result<Vec<DefenseSession>>;
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for std::sync::Arc<T> {
    fn insert(&self, session: &DefenseSession) -> Result<()> {
        (**self).insert(session)
    }

    fn update(&self, session: &DefenseSession) -> Result<()> {
        (**self).update(session)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        (**self).delete(id)
    }

    fn get(&self, id: &str) -> Result<Option<DefenseSession>> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<DefenseSession>> {
        (**self).list()
    }
}
