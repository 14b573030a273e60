//! Work calendar and slot timeline.
//!
//! Defines when defenses may take place: working days (every day minus
//! the weekly day-off minus excluded dates), the daily working window,
//! and the fixed session/break rhythm that turns a day into slots.
//!
//! # Time Model
//! Times of day are whole minutes since midnight. Dates are
//! [`chrono::NaiveDate`] values; the calendar has no time zone.
//!
//! # Slot Rhythm
//! Within a working day, slot `n + 1` starts `session + break` minutes
//! after slot `n`. A slot is emitted only if it ends at or before the
//! end of the working window, so a session longer than the window
//! yields an empty day rather than an error.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Minutes since midnight for a time of day (seconds are dropped).
#[inline]
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// A time-of-day interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    /// Interval start (minutes since midnight, inclusive).
    pub start_min: u32,
    /// Interval end (minutes since midnight, exclusive).
    pub end_min: u32,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_min: u32, end_min: u32) -> Self {
        Self { start_min, end_min }
    }

    /// Window of `duration_min` minutes starting at `start`.
    pub fn starting_at(start: NaiveTime, duration_min: u32) -> Self {
        Self::from_minute(minute_of_day(start), duration_min)
    }

    /// Window of `duration_min` minutes starting at minute `start_min`.
    /// The end saturates, so an absurd duration yields a window that
    /// fits no working day.
    pub fn from_minute(start_min: u32, duration_min: u32) -> Self {
        Self::new(start_min, start_min.saturating_add(duration_min))
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_min && minute < self.end_min
    }

    /// Whether two windows overlap. Touching windows do not.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Window widened by `margin` minutes on both sides (clamped at midnight
    /// and at `u32::MAX`).
    pub fn padded(&self, margin: u32) -> Self {
        Self::new(
            self.start_min.saturating_sub(margin),
            self.end_min.saturating_add(margin),
        )
    }

    /// Start as a time of day.
    pub fn start_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.start_min / 60, self.start_min % 60, 0)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60
        )
    }
}

/// A candidate defense slot: a date plus a session-long window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// Calendar date.
    pub date: NaiveDate,
    /// Session window on that date.
    pub window: TimeWindow,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.window)
    }
}

fn default_horizon_days() -> u32 {
    30
}

fn default_working_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_working_end() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_session_minutes() -> u32 {
    60
}

fn default_break_minutes() -> u32 {
    60
}

fn default_day_off() -> Option<Weekday> {
    Some(Weekday::Fri)
}

/// Calendar configuration for one defense batch.
///
/// An immutable value passed into every scheduling call; nothing in the
/// crate reads calendar settings from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CalendarConfig {
    /// Session/batch label (e.g. "June 2026").
    #[serde(default)]
    pub batch: String,
    /// First calendar date of the timeline.
    pub start_date: NaiveDate,
    /// Calendar days covered by the timeline, `start_date` included.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Start of the daily working window.
    #[serde(default = "default_working_start")]
    pub working_start: NaiveTime,
    /// End of the daily working window.
    #[serde(default = "default_working_end")]
    pub working_end: NaiveTime,
    /// Fixed defense duration (minutes).
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
    /// Gap between consecutive sessions in the same room (minutes).
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Weekly non-working day. `None` = every weekday works.
    #[serde(default = "default_day_off")]
    pub day_off: Option<Weekday>,
    /// Explicit date denylist.
    #[serde(default)]
    pub excluded_dates: BTreeSet<NaiveDate>,
}

impl CalendarConfig {
    /// Creates a calendar starting at `start_date` with the defaults:
    /// 08:00-16:00, 60-minute sessions, 60-minute breaks, Friday off,
    /// 30-day horizon.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            batch: String::new(),
            start_date,
            horizon_days: default_horizon_days(),
            working_start: default_working_start(),
            working_end: default_working_end(),
            session_minutes: default_session_minutes(),
            break_minutes: default_break_minutes(),
            day_off: default_day_off(),
            excluded_dates: BTreeSet::new(),
        }
    }

    /// Sets the batch label.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = batch.into();
        self
    }

    /// Sets the number of calendar days in the timeline.
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Sets the daily working window.
    pub fn with_working_hours(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.working_start = start;
        self.working_end = end;
        self
    }

    /// Sets the session duration (minutes).
    pub fn with_session_minutes(mut self, minutes: u32) -> Self {
        self.session_minutes = minutes;
        self
    }

    /// Sets the break between same-room sessions (minutes).
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes;
        self
    }

    /// Sets (or clears) the weekly day-off.
    pub fn with_day_off(mut self, day: Option<Weekday>) -> Self {
        self.day_off = day;
        self
    }

    /// Adds an excluded date.
    pub fn with_excluded_date(mut self, date: NaiveDate) -> Self {
        self.excluded_dates.insert(date);
        self
    }

    /// Working window start (minutes since midnight).
    #[inline]
    pub fn working_start_min(&self) -> u32 {
        minute_of_day(self.working_start)
    }

    /// Working window end (minutes since midnight).
    #[inline]
    pub fn working_end_min(&self) -> u32 {
        minute_of_day(self.working_end)
    }

    /// Last date covered by the timeline, or `None` for an empty horizon.
    pub fn last_date(&self) -> Option<NaiveDate> {
        let offset = self.horizon_days.checked_sub(1)?;
        self.start_date.checked_add_days(Days::new(u64::from(offset)))
    }

    /// Whether defenses may take place on `date` at all.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.day_off != Some(date.weekday()) && !self.excluded_dates.contains(&date)
    }

    /// Whether a window lies inside the working hours.
    pub fn fits_working_hours(&self, window: &TimeWindow) -> bool {
        window.start_min >= self.working_start_min() && window.end_min <= self.working_end_min()
    }

    /// Session-long window starting at `start`.
    pub fn window_at(&self, start: NaiveTime) -> TimeWindow {
        TimeWindow::starting_at(start, self.session_minutes)
    }

    /// Lazy, chronological slot timeline over the whole horizon.
    ///
    /// The iterator borrows the configuration and can be cloned or
    /// recreated at will: slot generation is a pure function of `self`.
    pub fn slots(&self) -> SlotIter<'_> {
        SlotIter {
            calendar: self,
            day_offset: 0,
            day: None,
        }
    }

    /// Slots on a single date (empty on non-working days).
    pub fn slots_on(&self, date: NaiveDate) -> Vec<Slot> {
        if !self.is_working_day(date) {
            return Vec::new();
        }
        self.day_windows()
            .map(|window| Slot { date, window })
            .collect()
    }

    /// Number of slots per working day.
    pub fn slots_per_day(&self) -> usize {
        self.day_windows().count()
    }

    /// Upper bound on sessions the timeline can hold with `room_count` rooms.
    pub fn slot_capacity(&self, room_count: usize) -> usize {
        self.slots().count() * room_count
    }

    fn day_windows(&self) -> DayWindows {
        DayWindows {
            session: self.session_minutes,
            step: self.session_minutes.checked_add(self.break_minutes),
            end: self.working_end_min(),
            next: (self.session_minutes > 0).then(|| self.working_start_min()),
        }
    }
}

/// Session windows of one working day, in rhythm order.
///
/// The day ends at the first window past the working end, or as soon as
/// the next start would overflow.
#[derive(Debug, Clone)]
struct DayWindows {
    session: u32,
    step: Option<u32>,
    end: u32,
    next: Option<u32>,
}

impl Iterator for DayWindows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        let start = self.next.take()?;
        let end = start.checked_add(self.session).filter(|&e| e <= self.end)?;
        self.next = self.step.and_then(|step| start.checked_add(step));
        Some(TimeWindow::new(start, end))
    }
}

/// Iterator over the slots of a [`CalendarConfig`].
#[derive(Debug, Clone)]
pub struct SlotIter<'a> {
    calendar: &'a CalendarConfig,
    day_offset: u32,
    day: Option<(NaiveDate, DayWindows)>,
}

impl Iterator for SlotIter<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let cal = self.calendar;
        loop {
            if let Some((date, windows)) = self.day.as_mut() {
                match windows.next() {
                    Some(window) => return Some(Slot { date: *date, window }),
                    None => {
                        // Day exhausted: advance
                        self.day = None;
                        self.day_offset += 1;
                    }
                }
            }

            if self.day_offset >= cal.horizon_days {
                return None;
            }
            let date = cal
                .start_date
                .checked_add_days(Days::new(u64::from(self.day_offset)))?;
            if cal.is_working_day(date) {
                self.day = Some((date, cal.day_windows()));
            } else {
                self.day_offset += 1;
            }
        }
    }
}
