//! Conflict-checked rescheduling of an existing session.
//!
//! Drag-and-drop (new date, same time), time edits (same date, new time)
//! and explicit room changes all go through one transition:
//!
//! 1. Release the session so it cannot conflict with itself.
//! 2. Reject non-working dates and windows outside working hours.
//! 3. Try candidate rooms in order; the first room that is free while
//!    every person is free wins.
//! 4. On rejection, re-reserve the original session unchanged and report
//!    the first obstacle found.
//!
//! Person conflicts are always checked, not only room conflicts. Rooms
//! additionally keep the configured break free on both sides of a session,
//! so an off-grid time edit cannot squeeze two defenses together.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityTracker, Conflict};
use crate::error::{Result, SchedulingError};
use crate::models::{CalendarConfig, DefenseSession, Room, TimeWindow};
use crate::validation::{ValidationError, ValidationErrorKind};

/// A requested move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleRequest {
    /// Target date.
    pub new_date: NaiveDate,
    /// Target start time. `None` keeps the current start.
    pub new_start: Option<NaiveTime>,
    /// Required room. `None` lets the validator pick.
    pub room_id: Option<String>,
}

impl RescheduleRequest {
    /// Move to another date, keeping the start time (drag-and-drop).
    pub fn move_to(new_date: NaiveDate) -> Self {
        Self {
            new_date,
            new_start: None,
            room_id: None,
        }
    }

    /// Move to a date and start time.
    pub fn at(new_date: NaiveDate, new_start: NaiveTime) -> Self {
        Self {
            new_date,
            new_start: Some(new_start),
            room_id: None,
        }
    }

    /// Requires a specific room.
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }
}

/// Validates placements against the calendar, the rooms and the ledger.
#[derive(Debug, Clone, Copy)]
pub struct RescheduleValidator<'a> {
    calendar: &'a CalendarConfig,
    rooms: &'a [Room],
}

impl<'a> RescheduleValidator<'a> {
    /// Creates a validator over a configuration.
    pub fn new(calendar: &'a CalendarConfig, rooms: &'a [Room]) -> Self {
        Self { calendar, rooms }
    }

    /// Moves `session` per `request`.
    ///
    /// On success the updated session is reserved in `tracker` and returned.
    /// On failure `tracker` holds the original session exactly as before.
    pub fn reschedule(
        &self,
        tracker: &mut AvailabilityTracker,
        session: &DefenseSession,
        request: &RescheduleRequest,
    ) -> Result<DefenseSession> {
        tracker.release(session);

        let window = match request.new_start {
            Some(start) => self.calendar.window_at(start),
            None => TimeWindow::from_minute(session.window.start_min, self.calendar.session_minutes),
        };

        let placed = self.find_room(
            tracker,
            request.new_date,
            &window,
            &session.persons,
            request.room_id.as_deref(),
            Some(&session.room_id),
        );

        match placed {
            Ok(room_id) => {
                let mut updated = session.clone();
                updated.date = request.new_date;
                updated.window = window;
                updated.room_id = room_id;
                tracker.reserve(&updated);
                Ok(updated)
            }
            Err(err) => {
                tracker.reserve(session);
                Err(err)
            }
        }
    }

    /// Finds a room for `persons` at (`date`, `window`) without booking it.
    ///
    /// With `explicit_room` only that room is tried. Otherwise `preferred`
    /// (if configured) is tried first, then every room in configured order.
    pub fn find_room<S: AsRef<str>>(
        &self,
        tracker: &AvailabilityTracker,
        date: NaiveDate,
        window: &TimeWindow,
        persons: &[S],
        explicit_room: Option<&str>,
        preferred: Option<&str>,
    ) -> Result<String> {
        if !self.calendar.is_working_day(date) {
            return Err(SchedulingError::ExcludedDate { date });
        }
        if !self.calendar.fits_working_hours(window) {
            return Err(SchedulingError::OutsideWorkingHours { window: *window });
        }

        let candidates = self.candidates(explicit_room, preferred)?;

        let margin = self.calendar.break_minutes;
        let mut first: Option<Conflict> = None;
        for room in candidates {
            match tracker.first_conflict(date, window, &room.id, persons, margin) {
                None => return Ok(room.id.clone()),
                Some(conflict) => {
                    first.get_or_insert(conflict);
                }
            }
        }

        Err(first.map_or_else(no_rooms, SchedulingError::from))
    }

    fn candidates(&self, explicit: Option<&str>, preferred: Option<&str>) -> Result<Vec<&'a Room>> {
        if let Some(id) = explicit {
            return self
                .rooms
                .iter()
                .find(|r| r.id == id)
                .map(|r| vec![r])
                .ok_or_else(|| SchedulingError::UnknownRoom(id.to_string()));
        }

        let mut ordered: Vec<&Room> = Vec::with_capacity(self.rooms.len());
        if let Some(room) = preferred.and_then(|id| self.rooms.iter().find(|r| r.id == id)) {
            ordered.push(room);
        }
        ordered.extend(self.rooms.iter().filter(|r| Some(r.id.as_str()) != preferred));
        Ok(ordered)
    }
}

fn no_rooms() -> SchedulingError {
    SchedulingError::InvalidConfiguration(vec![ValidationError::new(
        ValidationErrorKind::NoRooms,
        "At least one room is required",
    )])
}
