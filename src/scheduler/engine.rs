//! Greedy earliest-slot assignment engine.
//!
//! # Algorithm
//!
//! 1. Validate the input; reject the whole run on any structural problem.
//! 2. Build the slot timeline from the calendar.
//! 3. For each project, in input order, walk the timeline.
//! 4. For each slot, try rooms in input order; the first room that is free
//!    while every constrained person is free wins.
//! 5. A project that finds nothing is reported unassigned; the run continues.
//!
//! Input order is the priority policy and is never re-sorted, so the
//! output is a pure function of the input.
//!
//! # Complexity
//! O(p * s * r * k) where p=projects, s=slots, r=rooms and k=bookings per day.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::summary::GenerationSummary;
use crate::availability::AvailabilityTracker;
use crate::error::{Result, SchedulingError};
use crate::models::{session_id_for, CalendarConfig, DefenseSession, Project, Room};
use crate::validation::validate_input;

/// Input container for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Projects, in priority order.
    pub projects: Vec<Project>,
    /// Rooms, in preference order.
    pub rooms: Vec<Room>,
    /// Calendar of the batch.
    pub calendar: CalendarConfig,
}

impl GenerateRequest {
    /// Creates a new generation request.
    pub fn new(projects: Vec<Project>, rooms: Vec<Room>, calendar: CalendarConfig) -> Self {
        Self {
            projects,
            rooms,
            calendar,
        }
    }
}

/// Why a project received no session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnassignedReason {
    /// Timeline exhausted without a free (slot, room) pair.
    NoFeasibleSlot,
    /// The project already holds a session.
    AlreadyScheduled,
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnassignedReason::NoFeasibleSlot => f.write_str("no feasible slot"),
            UnassignedReason::AlreadyScheduled => f.write_str("already scheduled"),
        }
    }
}

/// A project left without a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unassigned {
    /// Project identifier.
    pub project_id: String,
    /// Cause.
    pub reason: UnassignedReason,
}

/// Result of a generation run: always a summary, never all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Newly created sessions, in project order.
    pub sessions: Vec<DefenseSession>,
    /// Projects that received no session.
    pub unassigned: Vec<Unassigned>,
    /// Aggregate metrics.
    pub summary: GenerationSummary,
}

impl GenerationOutcome {
    /// Whether every project was placed.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Greedy earliest-slot scheduler.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use pfe_schedule::models::{CalendarConfig, Jury, Project, Room, Supervision};
/// use pfe_schedule::scheduler::AssignmentEngine;
///
/// let calendar = CalendarConfig::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
/// let projects = vec![
///     Project::new("P1", "Telemetry", Jury::new("T1", "T2"), Supervision::new("T3"))
///         .with_student("S1"),
/// ];
/// let rooms = vec![Room::named("Amphi A")];
///
/// let outcome = AssignmentEngine::new().schedule(&projects, &rooms, &calendar).unwrap();
/// assert_eq!(outcome.sessions.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AssignmentEngine;

impl AssignmentEngine {
    /// Creates a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Schedules projects on an empty ledger.
    pub fn schedule(
        &self,
        projects: &[Project],
        rooms: &[Room],
        calendar: &CalendarConfig,
    ) -> Result<GenerationOutcome> {
        let mut tracker = AvailabilityTracker::new();
        self.schedule_with(&mut tracker, projects, rooms, calendar)
    }

    /// Schedules from a request.
    pub fn schedule_request(&self, request: &GenerateRequest) -> Result<GenerationOutcome> {
        self.schedule(&request.projects, &request.rooms, &request.calendar)
    }

    /// Schedules projects around the bookings already in `tracker`.
    ///
    /// New sessions are reserved in `tracker` as they are placed.
    pub fn schedule_with(
        &self,
        tracker: &mut AvailabilityTracker,
        projects: &[Project],
        rooms: &[Room],
        calendar: &CalendarConfig,
    ) -> Result<GenerationOutcome> {
        validate_input(projects, rooms, calendar).map_err(SchedulingError::InvalidConfiguration)?;

        tracing::info!(
            batch = %calendar.batch,
            projects = projects.len(),
            rooms = rooms.len(),
            start_date = %calendar.start_date,
            horizon_days = calendar.horizon_days,
            "Generating defense sessions"
        );

        let mut sessions = Vec::new();
        let mut unassigned = Vec::new();

        for project in projects {
            if tracker.is_reserved(&session_id_for(&project.id)) {
                tracing::debug!(project_id = %project.id, "Project already scheduled, skipping");
                unassigned.push(Unassigned {
                    project_id: project.id.clone(),
                    reason: UnassignedReason::AlreadyScheduled,
                });
                continue;
            }

            match self.place(tracker, project, rooms, calendar) {
                Some(session) => {
                    tracing::debug!(
                        project_id = %project.id,
                        date = %session.date,
                        window = %session.window,
                        room_id = %session.room_id,
                        "Project placed"
                    );
                    sessions.push(session);
                }
                None => {
                    tracing::warn!(project_id = %project.id, "No feasible slot for project");
                    unassigned.push(Unassigned {
                        project_id: project.id.clone(),
                        reason: UnassignedReason::NoFeasibleSlot,
                    });
                }
            }
        }

        let summary = GenerationSummary::calculate(&sessions, unassigned.len(), rooms, calendar);
        tracing::info!(
            batch = %calendar.batch,
            scheduled = summary.scheduled,
            unscheduled = summary.unscheduled,
            days_used = summary.days_used,
            "Generation finished"
        );

        Ok(GenerationOutcome {
            sessions,
            unassigned,
            summary,
        })
    }

    /// Earliest (slot, room) for one project; reserves it on success.
    fn place(
        &self,
        tracker: &mut AvailabilityTracker,
        project: &Project,
        rooms: &[Room],
        calendar: &CalendarConfig,
    ) -> Option<DefenseSession> {
        let persons = project.constrained_persons();

        for slot in calendar.slots() {
            // Person availability does not depend on the room
            if !persons
                .iter()
                .all(|p| tracker.is_person_free(p, slot.date, &slot.window))
            {
                continue;
            }

            let free_room = rooms.iter().find(|room| {
                tracker.is_room_clear(&room.id, slot.date, &slot.window, calendar.break_minutes)
            });

            if let Some(room) = free_room {
                let session = DefenseSession::for_project(project, slot, &room.id)
                    .with_batch(&calendar.batch);
                tracker.reserve(&session);
                return Some(session);
            }
        }

        None
    }
}
