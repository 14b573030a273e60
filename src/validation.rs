//! Input validation for defense scheduling.
//!
//! Checks structural integrity of the calendar, rooms, and projects
//! before scheduling. Detects:
//! - Inverted working hours and a zero session duration
//! - Missing rooms, duplicate room ids, duplicate room names (case-insensitive)
//! - Duplicate project ids
//! - Blank person ids and student groups outside 1-2 students
//!
//! A session longer than the working window is *not* an error: the
//! calendar simply yields no slots and every project is reported as
//! unassigned.

use crate::models::{CalendarConfig, Project, Room};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// `working_start >= working_end`.
    InvertedHours,
    /// Session duration is zero.
    ZeroSessionDuration,
    /// No room configured.
    NoRooms,
    /// Two entities share the same ID.
    DuplicateId,
    /// Two rooms share a name (ignoring case and surrounding spaces).
    DuplicateRoomName,
    /// A room has a blank id or name.
    BlankRoom,
    /// A jury or supervision slot holds a blank person id.
    BlankPerson,
    /// A project has no students or more than two.
    InvalidStudentGroup,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the calendar configuration.
pub fn validate_calendar(calendar: &CalendarConfig) -> ValidationResult {
    let mut errors = Vec::new();
    check_calendar(calendar, &mut errors);
    finish(errors)
}

/// Validates the room list.
pub fn validate_rooms(rooms: &[Room]) -> ValidationResult {
    let mut errors = Vec::new();
    check_rooms(rooms, &mut errors);
    finish(errors)
}

/// Validates the project list.
pub fn validate_projects(projects: &[Project]) -> ValidationResult {
    let mut errors = Vec::new();
    check_projects(projects, &mut errors);
    finish(errors)
}

/// Validates the rooms and calendar a service runs with.
pub fn validate_setup(rooms: &[Room], calendar: &CalendarConfig) -> ValidationResult {
    let mut errors = Vec::new();
    check_calendar(calendar, &mut errors);
    check_rooms(rooms, &mut errors);
    finish(errors)
}

/// Validates the input data for a generation run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    projects: &[Project],
    rooms: &[Room],
    calendar: &CalendarConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    check_calendar(calendar, &mut errors);
    check_rooms(rooms, &mut errors);
    check_projects(projects, &mut errors);
    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_calendar(calendar: &CalendarConfig, errors: &mut Vec<ValidationError>) {
    if calendar.working_start >= calendar.working_end {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvertedHours,
            format!(
                "Working hours inverted: start {} is not before end {}",
                calendar.working_start, calendar.working_end
            ),
        ));
    }

    if calendar.session_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroSessionDuration,
            "Session duration must be at least one minute",
        ));
    }
}

fn check_rooms(rooms: &[Room], errors: &mut Vec<ValidationError>) {
    if rooms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoRooms,
            "At least one room is required",
        ));
        return;
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for r in rooms {
        if r.id.trim().is_empty() || r.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankRoom,
                format!("Room '{}' has a blank id or name", r.id),
            ));
            continue;
        }
        if !ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if !names.insert(r.name_key()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateRoomName,
                format!("Duplicate room name: {}", r.name.trim()),
            ));
        }
    }
}

fn check_projects(projects: &[Project], errors: &mut Vec<ValidationError>) {
    let mut ids = HashSet::new();
    for project in projects {
        if !ids.insert(project.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate project ID: {}", project.id),
            ));
        }

        for (role, person) in project.participants() {
            if person.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BlankPerson,
                    format!("Project '{}' has a blank {role}", project.id),
                ));
            }
        }

        if project.students.is_empty() || project.students.len() > 2 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidStudentGroup,
                format!(
                    "Project '{}' has {} students (expected 1 or 2)",
                    project.id,
                    project.students.len()
                ),
            ));
        }
    }
}
