//! Generation summary metrics.
//!
//! Computes the figures an operator sees after a batch run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled | Sessions created by the run |
//! | Unscheduled | Projects left without a session |
//! | Days used | Distinct dates holding a new session |
//! | First/last date | Date span of the new sessions |
//! | Sessions per room | New sessions hosted by each room |
//! | Room utilization | Sessions / timeline slots, per room |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CalendarConfig, DefenseSession, Room};

/// Batch generation summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationSummary {
    /// Number of sessions created.
    pub scheduled: usize,
    /// Number of projects left unassigned.
    pub unscheduled: usize,
    /// Distinct dates holding at least one new session.
    pub days_used: usize,
    /// Earliest session date.
    pub first_date: Option<NaiveDate>,
    /// Latest session date.
    pub last_date: Option<NaiveDate>,
    /// Sessions per room id (every configured room listed).
    pub sessions_per_room: BTreeMap<String, usize>,
    /// Fraction of the room's timeline slots in use (0.0..1.0).
    pub room_utilization: BTreeMap<String, f64>,
}

impl GenerationSummary {
    /// Computes the summary of a run.
    ///
    /// # Arguments
    /// * `sessions` - Sessions created by the run.
    /// * `unscheduled` - Number of projects that were not placed.
    /// * `rooms` - Configured rooms.
    /// * `calendar` - Calendar the run used (for slot counts).
    pub fn calculate(
        sessions: &[DefenseSession],
        unscheduled: usize,
        rooms: &[Room],
        calendar: &CalendarConfig,
    ) -> Self {
        let dates: BTreeSet<NaiveDate> = sessions.iter().map(|s| s.date).collect();

        let mut sessions_per_room: BTreeMap<String, usize> =
            rooms.iter().map(|r| (r.id.clone(), 0)).collect();
        for s in sessions {
            *sessions_per_room.entry(s.room_id.clone()).or_insert(0) += 1;
        }

        let slots = calendar.slots().count();
        let room_utilization = sessions_per_room
            .iter()
            .map(|(id, &count)| {
                let util = if slots == 0 {
                    0.0
                } else {
                    count as f64 / slots as f64
                };
                (id.clone(), util)
            })
            .collect();

        Self {
            scheduled: sessions.len(),
            unscheduled,
            days_used: dates.len(),
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
            sessions_per_room,
            room_utilization,
        }
    }

    /// Mean utilization across rooms (0.0 when there are no rooms).
    pub fn avg_utilization(&self) -> f64 {
        if self.room_utilization.is_empty() {
            return 0.0;
        }
        self.room_utilization.values().sum::<f64>() / self.room_utilization.len() as f64
    }
}
