//! Error types for defense scheduling.
//!
//! Every rejection carries a single, specific cause so the calling layer
//! can explain it to the operator. Per-project infeasibility during batch
//! generation is not an error: it is reported through
//! [`UnassignedReason`](crate::scheduler::UnassignedReason).

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::TimeWindow;
use crate::validation::ValidationError;

/// All errors produced by the scheduler and its service layer.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Input rejected before any scheduling attempt.
    #[error("Invalid configuration: {}", join_messages(.0))]
    InvalidConfiguration(Vec<ValidationError>),

    /// Target date is the weekly day-off or an excluded date.
    #[error("Date {date} is not a working day")]
    ExcludedDate { date: NaiveDate },

    /// Session would start before or end after the working window.
    #[error("Session {window} falls outside working hours")]
    OutsideWorkingHours { window: TimeWindow },

    /// Room already holds an overlapping session.
    #[error("Room '{room_id}' is occupied by session '{blocking_session}'")]
    RoomConflict {
        room_id: String,
        blocking_session: String,
    },

    /// A jury member or supervisor is already booked at that time.
    #[error("Person '{person_id}' is already booked in session '{blocking_session}'")]
    PersonConflict {
        person_id: String,
        blocking_session: String,
    },

    /// No session with this id exists.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Explicit room is not part of the configuration.
    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    /// Project already has a defense session.
    #[error("Project already scheduled: {0}")]
    ProjectAlreadyScheduled(String),

    /// Settings file could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A lock guarding shared scheduling state was poisoned.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulingError {
    /// Whether the caller can recover by correcting input or picking another slot.
    ///
    /// Storage and IO failures are fatal for the operation that hit them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SchedulingError::Storage(_)
                | SchedulingError::LockPoisoned(_)
                | SchedulingError::Io(_)
                | SchedulingError::Json(_)
        )
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for scheduling operations
pub type Result<T> = std::result::Result<T, SchedulingError>;
