//! Occupancy ledger for rooms and people.
//!
//! Answers "is X free during [start, end) on date D" for rooms and
//! persons alike. The ledger is derived state: it is rebuilt by replaying
//! persisted sessions and never stored on its own.
//!
//! # Semantics
//! Two windows conflict iff they overlap (`a.start < b.end && b.start < a.end`).
//! The tracker knows nothing about roles: callers decide which person ids
//! a session occupies.
//!
//! # Complexity
//! Conflict checks are O(k) in the number of intervals booked that day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::SchedulingError;
use crate::models::{DefenseSession, TimeWindow};

/// Something that can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Occupant {
    /// A room, by room id.
    Room(String),
    /// A person, by person id.
    Person(String),
}

impl Occupant {
    fn is_room(&self, room_id: &str) -> bool {
        matches!(self, Occupant::Room(id) if id == room_id)
    }

    fn is_person(&self, person_id: &str) -> bool {
        matches!(self, Occupant::Person(id) if id == person_id)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Room(id) => write!(f, "room {id}"),
            Occupant::Person(id) => write!(f, "person {id}"),
        }
    }
}

/// One booked interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    /// Who or what is booked.
    pub occupant: Occupant,
    /// Booked window.
    pub window: TimeWindow,
    /// Session holding the booking.
    pub session_id: String,
}

/// First obstacle found for a candidate placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The room is taken.
    Room {
        room_id: String,
        session_id: String,
    },
    /// A person is taken.
    Person {
        person_id: String,
        session_id: String,
    },
}

impl From<Conflict> for SchedulingError {
    fn from(conflict: Conflict) -> Self {
        match conflict {
            Conflict::Room {
                room_id,
                session_id,
            } => SchedulingError::RoomConflict {
                room_id,
                blocking_session: session_id,
            },
            Conflict::Person {
                person_id,
                session_id,
            } => SchedulingError::PersonConflict {
                person_id,
                blocking_session: session_id,
            },
        }
    }
}

/// Per-date occupancy of rooms and persons.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTracker {
    days: BTreeMap<NaiveDate, Vec<Occupancy>>,
    /// Session id → date it is booked on.
    placed: HashMap<String, NaiveDate>,
}

impl AvailabilityTracker {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger by replaying sessions.
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a DefenseSession>) -> Self {
        let mut tracker = Self::new();
        tracker.rebuild(sessions);
        tracker
    }

    /// Discards all bookings and replays `sessions`.
    pub fn rebuild<'a>(&mut self, sessions: impl IntoIterator<Item = &'a DefenseSession>) {
        self.days.clear();
        self.placed.clear();
        for session in sessions {
            self.reserve(session);
        }
    }

    /// Whether `room_id` is free for `window` on `date`.
    pub fn is_room_free(&self, room_id: &str, date: NaiveDate, window: &TimeWindow) -> bool {
        self.blocker(date, window, |o| o.is_room(room_id)).is_none()
    }

    /// Whether `person_id` is free for `window` on `date`.
    pub fn is_person_free(&self, person_id: &str, date: NaiveDate, window: &TimeWindow) -> bool {
        self.blocker(date, window, |o| o.is_person(person_id)).is_none()
    }

    /// Whether `room_id` is free for `window` widened by `margin` minutes
    /// on both sides (the same-room break).
    pub fn is_room_clear(
        &self,
        room_id: &str,
        date: NaiveDate,
        window: &TimeWindow,
        margin: u32,
    ) -> bool {
        self.is_room_free(room_id, date, &window.padded(margin))
    }

    /// First conflict for placing `persons` in `room_id` at (`date`, `window`).
    ///
    /// The room is checked first, with `room_margin` minutes of required
    /// gap on both sides; then persons in the given order, without margin.
    pub fn first_conflict<S: AsRef<str>>(
        &self,
        date: NaiveDate,
        window: &TimeWindow,
        room_id: &str,
        persons: &[S],
        room_margin: u32,
    ) -> Option<Conflict> {
        let room_window = window.padded(room_margin);
        if let Some(b) = self.blocker(date, &room_window, |o| o.is_room(room_id)) {
            return Some(Conflict::Room {
                room_id: room_id.to_string(),
                session_id: b.session_id.clone(),
            });
        }
        persons.iter().find_map(|person| {
            let person = person.as_ref();
            self.blocker(date, window, |o| o.is_person(person))
                .map(|b| Conflict::Person {
                    person_id: person.to_string(),
                    session_id: b.session_id.clone(),
                })
        })
    }

    /// Records the session's room and persons as busy.
    ///
    /// Idempotent: reserving a session id again replaces its previous
    /// bookings, wherever they were.
    pub fn reserve(&mut self, session: &DefenseSession) {
        self.release_id(&session.id);

        let day = self.days.entry(session.date).or_default();
        day.push(Occupancy {
            occupant: Occupant::Room(session.room_id.clone()),
            window: session.window,
            session_id: session.id.clone(),
        });
        for person in &session.persons {
            day.push(Occupancy {
                occupant: Occupant::Person(person.clone()),
                window: session.window,
                session_id: session.id.clone(),
            });
        }
        self.placed.insert(session.id.clone(), session.date);
    }

    /// Removes every booking held by the session. Returns whether any existed.
    pub fn release(&mut self, session: &DefenseSession) -> bool {
        self.release_id(&session.id)
    }

    /// Removes every booking held by a session id.
    pub fn release_id(&mut self, session_id: &str) -> bool {
        let Some(date) = self.placed.remove(session_id) else {
            return false;
        };
        if let Some(day) = self.days.get_mut(&date) {
            day.retain(|o| o.session_id != session_id);
            if day.is_empty() {
                self.days.remove(&date);
            }
        }
        true
    }

    /// Whether a session id currently holds bookings.
    pub fn is_reserved(&self, session_id: &str) -> bool {
        self.placed.contains_key(session_id)
    }

    /// Number of sessions holding bookings.
    pub fn session_count(&self) -> usize {
        self.placed.len()
    }

    /// Bookings on a date.
    pub fn occupancy(&self, date: NaiveDate) -> &[Occupancy] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dates with at least one booking, ascending.
    pub fn busy_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    fn blocker(
        &self,
        date: NaiveDate,
        window: &TimeWindow,
        matches: impl Fn(&Occupant) -> bool,
    ) -> Option<&Occupancy> {
        // Earliest blocker, so the answer does not depend on booking order
        self.occupancy(date)
            .iter()
            .filter(|o| o.window.overlaps(window) && matches(&o.occupant))
            .min_by(|a, b| (a.window, &a.session_id).cmp(&(b.window, &b.session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionOrigin;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn session(id: &str, d: u32, start: u32, room: &str, persons: &[&str]) -> DefenseSession {
        DefenseSession {
            id: id.into(),
            project_id: id.into(),
            date: date(d),
            window: TimeWindow::new(start, start + 60),
            room_id: room.into(),
            persons: persons.iter().map(|p| p.to_string()).collect(),
            batch: String::new(),
            origin: SessionOrigin::Generated,
        }
    }

    #[test]
    fn test_reserve_blocks_room_and_persons() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S1", 1, 480, "R1", &["T1", "T2"]));

        let w = TimeWindow::new(500, 560);
        assert!(!t.is_room_free("R1", date(1), &w));
        assert!(!t.is_person_free("T1", date(1), &w));
        assert!(!t.is_person_free("T2", date(1), &w));
        assert!(t.is_room_free("R2", date(1), &w));
        assert!(t.is_person_free("T3", date(1), &w));
        // Another date is untouched
        assert!(t.is_room_free("R1", date(2), &w));
    }

    #[test]
    fn test_touching_windows_do_not_conflict() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S1", 1, 480, "R1", &["T1"]));
        let after = TimeWindow::new(540, 600);
        let before = TimeWindow::new(420, 480);
        assert!(t.is_room_free("R1", date(1), &after));
        assert!(t.is_person_free("T1", date(1), &before));
    }

    #[test]
    fn test_room_and_person_ids_do_not_collide() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S1", 1, 480, "X", &["T1"]));
        let w = TimeWindow::new(480, 540);
        assert!(t.is_person_free("X", date(1), &w));
        assert!(t.is_room_free("T1", date(1), &w));
    }

    #[test]
    fn test_reserve_is_idempotent() {
        let mut t = AvailabilityTracker::new();
        let s = session("S1", 1, 480, "R1", &["T1"]);
        t.reserve(&s);
        t.reserve(&s);
        assert_eq!(t.occupancy(date(1)).len(), 2);
        assert_eq!(t.session_count(), 1);
    }

    #[test]
    fn test_reserve_moved_session_replaces_old_booking() {
        let mut t = AvailabilityTracker::new();
        let s = session("S1", 1, 480, "R1", &["T1"]);
        t.reserve(&s);
        let mut moved = s.clone();
        moved.date = date(2);
        t.reserve(&moved);
        assert!(t.occupancy(date(1)).is_empty());
        assert_eq!(t.occupancy(date(2)).len(), 2);
    }

    #[test]
    fn test_release() {
        let mut t = AvailabilityTracker::new();
        let s = session("S1", 1, 480, "R1", &["T1"]);
        t.reserve(&s);
        assert!(t.release(&s));
        assert!(!t.release(&s));
        assert!(t.is_room_free("R1", date(1), &s.window));
        assert_eq!(t.busy_dates().count(), 0);
    }

    #[test]
    fn test_release_uses_recorded_date() {
        let mut t = AvailabilityTracker::new();
        let s = session("S1", 1, 480, "R1", &["T1"]);
        t.reserve(&s);
        // Stale copy pointing elsewhere still releases the real booking
        let mut stale = s.clone();
        stale.date = date(9);
        assert!(t.release(&stale));
        assert!(!t.is_reserved("S1"));
        assert!(t.occupancy(date(1)).is_empty());
    }

    #[test]
    fn test_first_conflict_room_before_person() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S1", 1, 480, "R1", &["T1"]));
        t.reserve(&session("S2", 1, 480, "R2", &["T2"]));
        let w = TimeWindow::new(480, 540);

        assert_eq!(
            t.first_conflict(date(1), &w, "R1", &["T2"], 0),
            Some(Conflict::Room {
                room_id: "R1".into(),
                session_id: "S1".into()
            })
        );
        assert_eq!(
            t.first_conflict(date(1), &w, "R3", &["T9", "T2", "T1"], 0),
            Some(Conflict::Person {
                person_id: "T2".into(),
                session_id: "S2".into()
            })
        );
        assert_eq!(t.first_conflict(date(1), &w, "R3", &["T9"], 0), None);
    }

    #[test]
    fn test_room_margin() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S1", 1, 480, "R1", &["T1"]));
        // 09:00-10:00 touches 08:00-09:00: free without margin, blocked with a break
        let next = TimeWindow::new(540, 600);
        assert!(t.is_room_clear("R1", date(1), &next, 0));
        assert!(!t.is_room_clear("R1", date(1), &next, 60));
        assert!(t.is_room_clear("R1", date(1), &TimeWindow::new(600, 660), 60));
        // Margin never applies to persons
        assert_eq!(t.first_conflict(date(1), &next, "R2", &["T1"], 60), None);
        assert!(matches!(
            t.first_conflict(date(1), &next, "R1", &["T9"], 60),
            Some(Conflict::Room { .. })
        ));
    }

    #[test]
    fn test_earliest_blocker_reported() {
        let mut t = AvailabilityTracker::new();
        t.reserve(&session("S2", 1, 600, "R1", &["T2"]));
        t.reserve(&session("S1", 1, 480, "R1", &["T1"]));

        // 09:00-10:00 padded by an hour touches both sessions
        let conflict = t.first_conflict(date(1), &TimeWindow::new(540, 600), "R1", &["T9"], 60);
        assert_eq!(
            conflict,
            Some(Conflict::Room {
                room_id: "R1".into(),
                session_id: "S1".into(),
            })
        );
    }

    #[test]
    fn test_conflict_into_error() {
        let err: SchedulingError = Conflict::Person {
            person_id: "T1".into(),
            session_id: "S1".into(),
        }
        .into();
        assert!(matches!(err, SchedulingError::PersonConflict { .. }));
    }

    #[test]
    fn test_rebuild_matches_incremental() {
        let sessions = vec![
            session("S1", 1, 480, "R1", &["T1", "T2"]),
            session("S2", 1, 600, "R1", &["T3"]),
            session("S3", 2, 480, "R2", &["T1"]),
        ];
        let mut live = AvailabilityTracker::new();
        for s in &sessions {
            live.reserve(s);
        }
        let replayed = AvailabilityTracker::from_sessions(&sessions);

        for d in 1..=2 {
            for start in (420..=900).step_by(30) {
                let w = TimeWindow::new(start, start + 60);
                for room in ["R1", "R2"] {
                    assert_eq!(
                        live.is_room_free(room, date(d), &w),
                        replayed.is_room_free(room, date(d), &w)
                    );
                }
                for person in ["T1", "T2", "T3"] {
                    assert_eq!(
                        live.is_person_free(person, date(d), &w),
                        replayed.is_person_free(person, date(d), &w)
                    );
                }
            }
        }
    }
}
