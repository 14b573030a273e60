//! Settings file.
//!
//! A YAML document with three sections:
//!
//! ```yaml
//! calendar:
//!   batch: June 2026
//!   start-date: 2026-06-01
//!   horizon-days: 14
//!   working-start: "08:00:00"
//!   working-end: "16:00:00"
//!   session-minutes: 60
//!   break-minutes: 60
//!   day-off: Fri
//!   excluded-dates: [2026-06-10]
//! rooms:
//!   - Amphi A
//!   - { id: B12, name: Room B12 }
//! storage:
//!   dir: data
//! ```
//!
//! `rooms` and `storage` may be omitted. Every calendar key except
//! `start-date` has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::models::{CalendarConfig, Room};
use crate::service::SchedulingService;
use crate::store::JsonlStore;
use crate::validation::validate_setup;

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Calendar for the batch.
    pub calendar: CalendarConfig,

    /// Rooms, in preference order.
    #[serde(default)]
    pub rooms: Vec<RoomSetting>,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// A room entry: a bare name, or an id with a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoomSetting {
    /// Name used as the id.
    Name(String),
    /// Explicit id and name.
    Full { id: String, name: String },
}

impl RoomSetting {
    /// Converts the entry into a room.
    pub fn to_room(&self) -> Room {
        match self {
            RoomSetting::Name(name) => Room::named(name.clone()),
            RoomSetting::Full { id, name } => Room::new(id.clone(), name.clone()),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding `sessions.jsonl`.
    pub dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SchedulingError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings = Self::from_yaml_str(&content)?;
        tracing::info!(path = %path.display(), rooms = settings.rooms.len(), "Loaded settings");
        Ok(settings)
    }

    /// Parse settings from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| SchedulingError::Config(format!("Failed to parse settings: {e}")))
    }

    /// Configured rooms, in file order.
    pub fn rooms(&self) -> Vec<Room> {
        self.rooms.iter().map(RoomSetting::to_room).collect()
    }

    /// Validate the calendar and rooms, collecting every problem.
    pub fn validate(&self) -> Result<()> {
        validate_setup(&self.rooms(), &self.calendar)
            .map_err(SchedulingError::InvalidConfiguration)
    }

    /// Opens a service over the JSONL store in the storage directory.
    pub fn open_service(&self) -> Result<SchedulingService<JsonlStore>> {
        self.validate()?;
        let store = JsonlStore::new(&self.storage.dir)?;
        SchedulingService::open(store, self.rooms(), self.calendar.clone())
    }
}
