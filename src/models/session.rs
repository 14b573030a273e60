//! Defense session (solution) model.
//!
//! A defense session books one project into a room on a date for one
//! session window. A [`Timetable`] is a set of sessions with the queries
//! the calendar view and the audit need.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Project, Slot, TimeWindow};

/// How a session came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOrigin {
    /// Placed by the assignment engine.
    #[default]
    Generated,
    /// Booked by an operator.
    Manual,
}

/// A scheduled defense.
///
/// Carries its constrained person ids so the occupancy ledger can be
/// rebuilt from persisted sessions alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefenseSession {
    /// Session identifier (one session per project).
    pub id: String,
    /// Defended project.
    pub project_id: String,
    /// Defense date.
    pub date: NaiveDate,
    /// Defense window on that date.
    pub window: TimeWindow,
    /// Assigned room.
    pub room_id: String,
    /// Jury and supervision person ids, deduplicated.
    pub persons: Vec<String>,
    /// Batch label copied from the calendar configuration.
    #[serde(default)]
    pub batch: String,
    /// Engine or operator.
    #[serde(default)]
    pub origin: SessionOrigin,
}

/// Session id for a project.
pub fn session_id_for(project_id: &str) -> String {
    format!("def-{project_id}")
}

impl DefenseSession {
    /// Creates a session for `project` in `slot` and `room_id`.
    pub fn for_project(project: &Project, slot: Slot, room_id: impl Into<String>) -> Self {
        Self {
            id: session_id_for(&project.id),
            project_id: project.id.clone(),
            date: slot.date,
            window: slot.window,
            room_id: room_id.into(),
            persons: project.constrained_persons(),
            batch: String::new(),
            origin: SessionOrigin::Generated,
        }
    }

    /// Sets the batch label.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = batch.into();
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: SessionOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The (date, window) this session occupies.
    #[inline]
    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date,
            window: self.window,
        }
    }

    /// Whether a person attends this session.
    pub fn involves(&self, person_id: &str) -> bool {
        self.persons.iter().any(|p| p == person_id)
    }

    /// Whether both sessions run at overlapping times on the same date.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date && self.window.overlaps(&other.window)
    }

    /// Whether both sessions need the same room or a common person.
    pub fn shares_resources(&self, other: &Self) -> bool {
        self.room_id == other.room_id || self.persons.iter().any(|p| other.involves(p))
    }

    /// Whether the two sessions double-book a room or a person.
    pub fn clashes_with(&self, other: &Self) -> bool {
        self.id != other.id && self.overlaps(other) && self.shares_resources(other)
    }
}

/// A set of defense sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// Sessions, in insertion order.
    pub sessions: Vec<DefenseSession>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timetable from sessions.
    pub fn from_sessions(sessions: Vec<DefenseSession>) -> Self {
        Self { sessions }
    }

    /// Adds a session.
    pub fn add(&mut self, session: DefenseSession) {
        self.sessions.push(session);
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the timetable has no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session defending a given project.
    pub fn session_for_project(&self, project_id: &str) -> Option<&DefenseSession> {
        self.sessions.iter().find(|s| s.project_id == project_id)
    }

    /// Sessions held in a room.
    pub fn sessions_for_room(&self, room_id: &str) -> Vec<&DefenseSession> {
        self.sessions.iter().filter(|s| s.room_id == room_id).collect()
    }

    /// Sessions a person attends.
    pub fn sessions_for_person(&self, person_id: &str) -> Vec<&DefenseSession> {
        self.sessions.iter().filter(|s| s.involves(person_id)).collect()
    }

    /// Sessions whose date lies in `[from, to]`.
    pub fn sessions_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&DefenseSession> {
        self.sessions
            .iter()
            .filter(|s| s.date >= from && s.date <= to)
            .collect()
    }

    /// Distinct dates with at least one session, ascending.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.sessions.iter().map(|s| s.date).collect()
    }

    /// Sorts sessions by (date, start, room).
    pub fn sort_chronologically(&mut self) {
        self.sessions
            .sort_by(|a, b| (a.date, a.window, &a.room_id).cmp(&(b.date, b.window, &b.room_id)));
    }

    /// Every pair of session ids that double-books a room or a person.
    ///
    /// Empty for any timetable the scheduler produced.
    pub fn clashes(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (i, a) in self.sessions.iter().enumerate() {
            for b in &self.sessions[i + 1..] {
                if a.clashes_with(b) {
                    out.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        out
    }

    /// Smallest gap (minutes) between consecutive sessions in the same room
    /// on the same day, or `None` if no room hosts two sessions on a day.
    pub fn min_same_room_gap(&self) -> Option<u32> {
        let mut sorted: Vec<&DefenseSession> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| (&a.room_id, a.date, a.window).cmp(&(&b.room_id, b.date, b.window)));
        sorted
            .windows(2)
            .filter(|w| w[0].room_id == w[1].room_id && w[0].date == w[1].date)
            .map(|w| w[1].window.start_min.saturating_sub(w[0].window.end_min))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Jury, Supervision};

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

    fn sample() -> Timetable {
        Timetable::from_sessions(vec![
            session("A", 1, 480, "R1", &["T1", "T2", "T3"]),
            session("B", 1, 600, "R1", &["T4", "T5", "T6"]),
            session("C", 1, 480, "R2", &["T4", "T7", "T8"]),
            session("D", 2, 480, "R1", &["T1", "T9", "T6"]),
        ])
    }

    #[test]
    fn test_for_project() {
        let p = Project::new("P9", "x", Jury::new("T1", "T2"), Supervision::new("T1"));
        let slot = Slot {
            date: date(3),
            window: TimeWindow::new(600, 660),
        };
        let s = DefenseSession::for_project(&p, slot, "R2").with_batch("June");
        assert_eq!(s.id, "def-P9");
        assert_eq!(s.persons, vec!["T1", "T2"]);
        assert_eq!(s.slot(), slot);
        assert_eq!(s.batch, "June");
        assert_eq!(s.origin, SessionOrigin::Generated);
    }

    #[test]
    fn test_clash_detection() {
        let a = session("A", 1, 480, "R1", &["T1"]);
        let same_room = session("B", 1, 510, "R1", &["T2"]);
        let same_person = session("C", 1, 500, "R2", &["T1"]);
        let touching = session("D", 1, 540, "R1", &["T1"]);
        let other_day = session("E", 2, 480, "R1", &["T1"]);

        assert!(a.clashes_with(&same_room));
        assert!(a.clashes_with(&same_person));
        assert!(!a.clashes_with(&touching));
        assert!(!a.clashes_with(&other_day));
        assert!(!a.clashes_with(&a.clone()));
    }

    #[test]
    fn test_timetable_queries() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.sessions_for_room("R1").len(), 3);
        assert_eq!(t.sessions_for_person("T4").len(), 2);
        assert_eq!(t.sessions_between(date(2), date(30)).len(), 1);
        assert_eq!(t.dates().len(), 2);
        assert_eq!(t.session_for_project("C").unwrap().room_id, "R2");
        assert!(t.clashes().is_empty());
    }

    #[test]
    fn test_clashes_reported_pairwise() {
        let mut t = sample();
        t.add(session("X", 1, 500, "R3", &["T2"]));
        assert_eq!(t.clashes(), vec![("A".to_string(), "X".to_string())]);
    }

    #[test]
    fn test_min_same_room_gap() {
        let t = sample();
        // R1 on day 1: 08:00-09:00 then 10:00-11:00
        assert_eq!(t.min_same_room_gap(), Some(60));
        assert_eq!(Timetable::new().min_same_room_gap(), None);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut t = sample();
        t.sessions.reverse();
        t.sort_chronologically();
        let ids: Vec<_> = t.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_session_serde_roundtrip() {
        let s = session("A", 1, 480, "R1", &["T1"]).with_origin(SessionOrigin::Manual);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"origin\":\"manual\""));
        assert!(json.contains("\"date\":\"2026-06-01\""));
        let back: DefenseSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
