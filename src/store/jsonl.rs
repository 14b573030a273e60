//! JSONL-based session store with in-memory caching.
//!
//! One session per line in `sessions.jsonl`. Inserts append; updates and
//! deletes rewrite the file from the cache. The file is written before
//! the cache changes, so a failed write leaves both untouched.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use super::ScheduleStore;
use crate::error::{Result, SchedulingError};
use crate::models::DefenseSession;

const SESSIONS_FILE: &str = "sessions.jsonl";

/// JSONL-based session store.
pub struct JsonlStore {
    path: PathBuf,
    cache: RwLock<Option<Vec<DefenseSession>>>,
}

impl JsonlStore {
    /// Create a store in `base_path`, creating the directory if needed.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref();
        fs::create_dir_all(base_path)?;
        Ok(Self {
            path: base_path.join(SESSIONS_FILE),
            cache: RwLock::new(None),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<DefenseSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut sessions: Vec<DefenseSession> = Vec::new();
        let mut lines = content.lines().filter(|l| !l.trim().is_empty()).peekable();
        while let Some(line) = lines.next() {
            match serde_json::from_str(line) {
                Ok(session) => sessions.push(session),
                // Unterminated last line: an append that never finished
                Err(err) if lines.peek().is_none() && !content.ends_with('\n') => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %err,
                        "Dropping truncated last record"
                    );
                    self.rewrite_file(&sessions)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        tracing::debug!(path = %self.path.display(), count = sessions.len(), "Loaded sessions");
        Ok(sessions)
    }

    /// Write-lock the cache, loading it from disk on first use.
    fn loaded(&self) -> Result<RwLockWriteGuard<'_, Option<Vec<DefenseSession>>>> {
        let mut cache = self
            .cache
            .write()
            .map_err(|e| SchedulingError::Storage(e.to_string()))?;
        if cache.is_none() {
            *cache = Some(self.load()?);
        }
        Ok(cache)
    }

    fn append_to_file(&self, session: &DefenseSession) -> Result<()> {
        let mut line = serde_json::to_string(session)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    fn rewrite_file(&self, sessions: &[DefenseSession]) -> Result<()> {
        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            for session in sessions {
                writeln!(file, "{}", serde_json::to_string(session)?)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScheduleStore for JsonlStore {
    fn insert(&self, session: &DefenseSession) -> Result<()> {
        let mut cache = self.loaded()?;
        let sessions = cache.get_or_insert_with(Vec::new);
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(SchedulingError::Storage(format!("Session already exists: {}", session.id)));
        }

        // Append to file first (source of truth)
        self.append_to_file(session)?;
        sessions.push(session.clone());
        Ok(())
    }

    fn update(&self, session: &DefenseSession) -> Result<()> {
        let mut cache = self.loaded()?;
        let sessions = cache.get_or_insert_with(Vec::new);
        let idx = sessions
            .iter()
            .position(|s| s.id == session.id)
            .ok_or_else(|| SchedulingError::SessionNotFound(session.id.clone()))?;

        let mut next = sessions.clone();
        next[idx] = session.clone();
        self.rewrite_file(&next)?;
        *sessions = next;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut cache = self.loaded()?;
        let sessions = cache.get_or_insert_with(Vec::new);
        let Some(idx) = sessions.iter().position(|s| s.id == id) else {
            return Ok(false);
        };

        let mut next = sessions.clone();
        next.remove(idx);
        self.rewrite_file(&next)?;
        *sessions = next;
        Ok(true)
    }

    fn get(&self, id: &str) -> Result<Option<DefenseSession>> {
        let cache = self.loaded()?;
        Ok(cache
            .as_ref()
            .and_then(|sessions| sessions.iter().find(|s| s.id == id).cloned()))
    }

    fn list(&self) -> Result<Vec<DefenseSession>> {
        let cache = self.loaded()?;
        Ok(cache.clone().unwrap_or_default())
    }
}
