//! Scheduling service: the operator-facing operations.
//!
//! Couples the occupancy ledger to a [`ScheduleStore`] so that the two
//! never disagree:
//!
//! - batch generation plans on a copy of the ledger, then persists each
//!   session before reserving it;
//! - reschedules reserve first, persist second, and re-reserve the
//!   original if the write fails;
//! - deletes persist first, then release.
//!
//! # Locking
//!
//! A `RwLock` gate keeps reschedules out of a running batch: generation
//! takes the exclusive side, everything else the shared side. Below the
//! gate, commits are serialized per date. A move spanning two dates locks
//! both in ascending order, so reschedules on disjoint dates run in
//! parallel. The ledger mutex itself is only held for in-memory work,
//! never across a store write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{NaiveDate, NaiveTime};

use crate::availability::AvailabilityTracker;
use crate::error::{Result, SchedulingError};
use crate::models::{
    session_id_for, CalendarConfig, DefenseSession, Project, Room, SessionOrigin, Slot, Timetable,
};
use crate::scheduler::{
    AssignmentEngine, GenerateRequest, GenerationOutcome, RescheduleRequest, RescheduleValidator,
};
use crate::store::ScheduleStore;
use crate::validation::{validate_projects, validate_setup};

/// Active rooms and calendar.
#[derive(Debug)]
struct Setup {
    rooms: Vec<Room>,
    calendar: CalendarConfig,
}

/// One mutex per date, created on first use and dropped once no
/// operation holds it.
#[derive(Debug, Default)]
struct DateLocks {
    locks: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl DateLocks {
    /// Lock handles for `dates`, deduplicated and in ascending date order.
    fn handles(&self, dates: &[NaiveDate]) -> Result<Vec<Arc<Mutex<()>>>> {
        let mut dates = dates.to_vec();
        dates.sort_unstable();
        dates.dedup();

        let mut locks = self.locks.lock().map_err(poisoned)?;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(dates
            .into_iter()
            .map(|date| Arc::clone(locks.entry(date).or_default()))
            .collect())
    }
}

fn lock_all(handles: &[Arc<Mutex<()>>]) -> Result<Vec<MutexGuard<'_, ()>>> {
    handles
        .iter()
        .map(|h| h.lock().map_err(poisoned))
        .collect()
}

fn poisoned<T>(err: PoisonError<T>) -> SchedulingError {
    SchedulingError::LockPoisoned(err.to_string())
}

/// Defense scheduling over a persistent store.
pub struct SchedulingService<S: ScheduleStore> {
    store: S,
    setup: RwLock<Arc<Setup>>,
    tracker: Mutex<AvailabilityTracker>,
    gate: RwLock<()>,
    date_locks: DateLocks,
    engine: AssignmentEngine,
}

impl<S: ScheduleStore> SchedulingService<S> {
    /// Opens a service over `store`, rebuilding the ledger from its sessions.
    pub fn open(store: S, rooms: Vec<Room>, calendar: CalendarConfig) -> Result<Self> {
        check_setup(&rooms, &calendar)?;

        let sessions = store.list()?;
        let tracker = AvailabilityTracker::from_sessions(&sessions);
        tracing::info!(
            sessions = sessions.len(),
            rooms = rooms.len(),
            batch = %calendar.batch,
            "Opened scheduling service"
        );

        Ok(Self {
            store,
            setup: RwLock::new(Arc::new(Setup { rooms, calendar })),
            tracker: Mutex::new(tracker),
            gate: RwLock::new(()),
            date_locks: DateLocks::default(),
            engine: AssignmentEngine::new(),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active calendar.
    pub fn calendar(&self) -> Result<CalendarConfig> {
        Ok(self.setup()?.calendar.clone())
    }

    /// Active rooms, in configured order.
    pub fn rooms(&self) -> Result<Vec<Room>> {
        Ok(self.setup()?.rooms.clone())
    }

    /// Replaces the active rooms and calendar.
    ///
    /// Existing sessions are kept as they are; only later operations use
    /// the new configuration.
    pub fn configure(&self, rooms: Vec<Room>, calendar: CalendarConfig) -> Result<()> {
        check_setup(&rooms, &calendar)?;
        let _batch = self.gate.write().map_err(poisoned)?;
        *self.setup.write().map_err(poisoned)? = Arc::new(Setup { rooms, calendar });
        Ok(())
    }

    /// Runs a batch generation and persists its sessions.
    ///
    /// Existing sessions are respected; projects that already have one are
    /// reported as already scheduled. The request's rooms and calendar
    /// become the active configuration. A store failure aborts the run:
    /// sessions persisted before it stay booked, the rest are dropped.
    pub fn generate(&self, request: GenerateRequest) -> Result<GenerationOutcome> {
        let _batch = self.gate.write().map_err(poisoned)?;

        let mut planned = self.lock_tracker()?.clone();
        let outcome = self.engine.schedule_with(
            &mut planned,
            &request.projects,
            &request.rooms,
            &request.calendar,
        )?;

        *self.setup.write().map_err(poisoned)? = Arc::new(Setup {
            rooms: request.rooms,
            calendar: request.calendar,
        });

        for session in &outcome.sessions {
            self.store.insert(session).inspect_err(|err| {
                tracing::error!(session_id = %session.id, error = %err, "Failed to persist session");
            })?;
            self.lock_tracker()?.reserve(session);
        }

        Ok(outcome)
    }

    /// Moves a session to another date, keeping its start time.
    pub fn move_session(&self, id: &str, new_date: NaiveDate) -> Result<DefenseSession> {
        self.transition(id, |_| RescheduleRequest::move_to(new_date))
    }

    /// Changes a session's start time on its current date.
    pub fn edit_session_time(&self, id: &str, new_start: NaiveTime) -> Result<DefenseSession> {
        self.transition(id, |session| RescheduleRequest::at(session.date, new_start))
    }

    /// Moves a session per `request` (date, optional time, optional room).
    pub fn reschedule(&self, id: &str, request: RescheduleRequest) -> Result<DefenseSession> {
        self.transition(id, |_| request.clone())
    }

    /// Books a session by hand for a project that has none.
    ///
    /// Checked exactly like a reschedule. Without `room_id` the first free
    /// room in configured order is used.
    pub fn book_manual(
        &self,
        project: &Project,
        date: NaiveDate,
        start: NaiveTime,
        room_id: Option<&str>,
    ) -> Result<DefenseSession> {
        validate_projects(std::slice::from_ref(project))
            .map_err(SchedulingError::InvalidConfiguration)?;

        let _shared = self.gate.read().map_err(poisoned)?;
        let setup = self.setup()?;
        let handles = self.date_locks.handles(&[date])?;
        let _guards = lock_all(&handles)?;

        let id = session_id_for(&project.id);
        let window = setup.calendar.window_at(start);

        let session = {
            let mut tracker = self.lock_tracker()?;
            if tracker.is_reserved(&id) || self.store.get(&id)?.is_some() {
                return Err(SchedulingError::ProjectAlreadyScheduled(project.id.clone()));
            }

            let validator = RescheduleValidator::new(&setup.calendar, &setup.rooms);
            let persons = project.constrained_persons();
            let room = validator
                .find_room(&tracker, date, &window, &persons, room_id, None)
                .inspect_err(|err| {
                    tracing::warn!(project_id = %project.id, %date, %window, error = %err, "Manual booking rejected");
                })?;

            let session = DefenseSession::for_project(project, Slot { date, window }, room)
                .with_batch(&setup.calendar.batch)
                .with_origin(SessionOrigin::Manual);
            tracker.reserve(&session);
            session
        };

        if let Err(err) = self.store.insert(&session) {
            tracing::error!(session_id = %session.id, error = %err, "Failed to persist session");
            self.lock_tracker()?.release(&session);
            return Err(err);
        }

        tracing::info!(
            session_id = %session.id,
            date = %session.date,
            window = %session.window,
            room_id = %session.room_id,
            "Session booked manually"
        );
        Ok(session)
    }

    /// Deletes a session. Returns `false` if it did not exist.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let _shared = self.gate.read().map_err(poisoned)?;

        loop {
            let Some(current) = self.store.get(id)? else {
                return Ok(false);
            };
            let handles = self.date_locks.handles(&[current.date])?;
            let _guards = lock_all(&handles)?;

            let Some(session) = self.store.get(id)? else {
                return Ok(false);
            };
            if session.date != current.date {
                continue;
            }

            if !self.store.delete(id)? {
                return Ok(false);
            }
            self.lock_tracker()?.release(&session);
            tracing::info!(session_id = %id, date = %session.date, "Session deleted");
            return Ok(true);
        }
    }

    /// Sessions sorted by (date, start, room), optionally limited to an
    /// inclusive date range.
    pub fn sessions(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<DefenseSession>> {
        let timetable = self.timetable()?;
        Ok(match range {
            Some((from, to)) => timetable
                .sessions_between(from, to)
                .into_iter()
                .cloned()
                .collect(),
            None => timetable.sessions,
        })
    }

    /// Sessions a person attends, chronologically.
    pub fn sessions_for_person(&self, person_id: &str) -> Result<Vec<DefenseSession>> {
        let timetable = self.timetable()?;
        Ok(timetable
            .sessions_for_person(person_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Sessions held in a room, chronologically.
    pub fn sessions_for_room(&self, room_id: &str) -> Result<Vec<DefenseSession>> {
        let timetable = self.timetable()?;
        Ok(timetable
            .sessions_for_room(room_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// All stored sessions as a chronologically sorted timetable.
    pub fn timetable(&self) -> Result<Timetable> {
        let mut timetable = Timetable::from_sessions(self.store.list()?);
        timetable.sort_chronologically();
        Ok(timetable)
    }

    /// Shared reschedule path. `build` derives the request from the
    /// session as read under its date lock.
    fn transition(
        &self,
        id: &str,
        build: impl Fn(&DefenseSession) -> RescheduleRequest,
    ) -> Result<DefenseSession> {
        let _shared = self.gate.read().map_err(poisoned)?;
        let setup = self.setup()?;

        loop {
            let current = self
                .store
                .get(id)?
                .ok_or_else(|| SchedulingError::SessionNotFound(id.to_string()))?;
            let planned = build(&current);

            let handles = self.date_locks.handles(&[current.date, planned.new_date])?;
            let _guards = lock_all(&handles)?;

            // Another commit may have moved the session before we got the locks
            let session = self
                .store
                .get(id)?
                .ok_or_else(|| SchedulingError::SessionNotFound(id.to_string()))?;
            let request = build(&session);
            if session.date != current.date || request.new_date != planned.new_date {
                continue;
            }

            return self.commit_reschedule(&setup, &session, &request);
        }
    }

    fn commit_reschedule(
        &self,
        setup: &Setup,
        session: &DefenseSession,
        request: &RescheduleRequest,
    ) -> Result<DefenseSession> {
        let validator = RescheduleValidator::new(&setup.calendar, &setup.rooms);
        let updated = validator
            .reschedule(&mut *self.lock_tracker()?, session, request)
            .inspect_err(|err| {
                tracing::warn!(
                    session_id = %session.id,
                    new_date = %request.new_date,
                    error = %err,
                    "Reschedule rejected"
                );
            })?;

        if let Err(err) = self.store.update(&updated) {
            tracing::error!(session_id = %session.id, error = %err, "Failed to persist reschedule");
            self.lock_tracker()?.reserve(session);
            return Err(err);
        }

        tracing::info!(
            session_id = %updated.id,
            from = %session.slot(),
            to = %updated.slot(),
            room_id = %updated.room_id,
            "Session rescheduled"
        );
        Ok(updated)
    }

    fn setup(&self) -> Result<Arc<Setup>> {
        Ok(Arc::clone(&*self.setup.read().map_err(poisoned)?))
    }

    fn lock_tracker(&self) -> Result<MutexGuard<'_, AvailabilityTracker>> {
        self.tracker.lock().map_err(poisoned)
    }
}

fn check_setup(rooms: &[Room], calendar: &CalendarConfig) -> Result<()> {
    validate_setup(rooms, calendar).map_err(SchedulingError::InvalidConfiguration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Jury, Supervision, TimeWindow};
    use crate::scheduler::UnassignedReason;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2026-06-01 is a Monday; slots at 08:00, 10:00, 12:00, 14:00; Friday off.
    fn calendar() -> CalendarConfig {
        CalendarConfig::new(date(1))
            .with_horizon_days(14)
            .with_batch("June")
    }

    fn rooms() -> Vec<Room> {
        vec![Room::named("R1"), Room::named("R2")]
    }

    fn project(id: &str, president: &str, examiner: &str, supervisor: &str) -> Project {
        Project::new(
            id,
            format!("Project {id}"),
            Jury::new(president, examiner),
            Supervision::new(supervisor),
        )
        .with_student(format!("S-{id}"))
    }

    fn two_projects() -> Vec<Project> {
        vec![
            project("P1", "T1", "T2", "T3"),
            project("P2", "T4", "T5", "T6"),
        ]
    }

    fn service_with(projects: Vec<Project>) -> SchedulingService<MemoryStore> {
        let service = SchedulingService::open(MemoryStore::new(), rooms(), calendar()).unwrap();
        service
            .generate(GenerateRequest::new(projects, rooms(), calendar()))
            .unwrap();
        service
    }

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(SchedulingError::Storage("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    impl ScheduleStore for FlakyStore {
        fn insert(&self, session: &DefenseSession) -> Result<()> {
            self.check()?;
            self.inner.insert(session)
        }

        fn update(&self, session: &DefenseSession) -> Result<()> {
            self.check()?;
            self.inner.update(session)
        }

        fn delete(&self, id: &str) -> Result<bool> {
            self.check()?;
            self.inner.delete(id)
        }

        fn get(&self, id: &str) -> Result<Option<DefenseSession>> {
            self.inner.get(id)
        }

        fn list(&self) -> Result<Vec<DefenseSession>> {
            self.inner.list()
        }
    }

    #[test]
    fn test_open_rejects_invalid_setup() {
        let result = SchedulingService::open(MemoryStore::new(), Vec::new(), calendar());
        assert!(matches!(
            result,
            Err(SchedulingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_generate_persists_and_reserves() {
        let service = service_with(two_projects());

        let sessions = service.sessions(None).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].room_id, "R1");
        assert_eq!(sessions[1].room_id, "R2");
        assert!(sessions.iter().all(|s| s.date == date(1) && s.window.start_min == 480));
        assert_eq!(service.tracker.lock().unwrap().session_count(), 2);
    }

    #[test]
    fn test_generate_twice_skips_scheduled_projects() {
        let service = service_with(two_projects());
        let outcome = service
            .generate(GenerateRequest::new(two_projects(), rooms(), calendar()))
            .unwrap();

        assert!(outcome.sessions.is_empty());
        assert!(outcome
            .unassigned
            .iter()
            .all(|u| u.reason == UnassignedReason::AlreadyScheduled));
        assert_eq!(service.sessions(None).unwrap().len(), 2);
    }

    #[test]
    fn test_move_session_keeps_start_and_room() {
        let service = service_with(two_projects());
        let moved = service.move_session("def-P1", date(2)).unwrap();

        assert_eq!(moved.date, date(2));
        assert_eq!(moved.window.start_min, 480);
        assert_eq!(moved.room_id, "R1");
        assert_eq!(service.store().get("def-P1").unwrap().unwrap(), moved);
    }

    #[test]
    fn test_move_to_day_off_rejected() {
        let service = service_with(two_projects());
        let err = service.move_session("def-P1", date(5)).unwrap_err();

        assert!(matches!(err, SchedulingError::ExcludedDate { date: d } if d == date(5)));
        assert_eq!(service.store().get("def-P1").unwrap().unwrap().date, date(1));
    }

    #[test]
    fn test_edit_time_outside_hours_rejected() {
        let service = service_with(two_projects());
        let err = service.edit_session_time("def-P1", hm(15, 30)).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideWorkingHours { .. }));

        let session = service.store().get("def-P1").unwrap().unwrap();
        assert_eq!(session.window, TimeWindow::new(480, 540));
    }

    #[test]
    fn test_edit_time_person_conflict() {
        let three_rooms = vec![Room::named("R1"), Room::named("R2"), Room::named("R3")];
        let service = SchedulingService::open(MemoryStore::new(), three_rooms.clone(), calendar())
            .unwrap();
        service
            .generate(GenerateRequest::new(
                vec![
                    project("P1", "T1", "T2", "T3"),
                    project("P3", "T1", "T7", "T8"),
                ],
                three_rooms,
                calendar(),
            ))
            .unwrap();

        let p3 = service.store().get("def-P3").unwrap().unwrap();
        assert_eq!(p3.window.start_min, 600);

        let err = service
            .reschedule("def-P3", RescheduleRequest::at(date(1), hm(8, 0)).in_room("R3"))
            .unwrap_err();
        match err {
            SchedulingError::PersonConflict {
                person_id,
                blocking_session,
            } => {
                assert_eq!(person_id, "T1");
                assert_eq!(blocking_session, "def-P1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(service.store().get("def-P3").unwrap().unwrap(), p3);
    }

    #[test]
    fn test_unknown_session() {
        let service = service_with(two_projects());
        assert!(matches!(
            service.move_session("def-P9", date(2)),
            Err(SchedulingError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_delete_frees_slot() {
        let service = service_with(two_projects());
        assert!(service.delete_session("def-P1").unwrap());
        assert!(!service.delete_session("def-P1").unwrap());

        let booked = service
            .book_manual(&project("P4", "T9", "T10", "T11"), date(1), hm(8, 0), Some("R1"))
            .unwrap();
        assert_eq!(booked.room_id, "R1");
    }

    #[test]
    fn test_book_manual() {
        let service = service_with(two_projects());
        let session = service
            .book_manual(&project("P4", "T9", "T10", "T11"), date(2), hm(9, 30), None)
            .unwrap();

        assert_eq!(session.origin, SessionOrigin::Manual);
        assert_eq!(session.batch, "June");
        assert_eq!(session.window, TimeWindow::new(570, 630));
        assert_eq!(session.room_id, "R1");
    }

    #[test]
    fn test_book_manual_already_scheduled() {
        let service = service_with(two_projects());
        let err = service
            .book_manual(&project("P1", "T1", "T2", "T3"), date(2), hm(8, 0), None)
            .unwrap_err();
        assert!(matches!(err, SchedulingError::ProjectAlreadyScheduled(id) if id == "P1"));
    }

    #[test]
    fn test_sessions_range_and_agendas() {
        let service = service_with(two_projects());
        service.move_session("def-P2", date(3)).unwrap();

        let first_day = service.sessions(Some((date(1), date(2)))).unwrap();
        assert_eq!(first_day.len(), 1);
        assert_eq!(first_day[0].id, "def-P1");

        assert_eq!(service.sessions_for_person("T5").unwrap()[0].id, "def-P2");
        assert!(service.sessions_for_person("T99").unwrap().is_empty());
        assert_eq!(service.sessions_for_room("R1").unwrap().len(), 1);
    }

    #[test]
    fn test_open_replays_store() {
        let store = Arc::new(MemoryStore::new());
        let first = SchedulingService::open(Arc::clone(&store), rooms(), calendar()).unwrap();
        first
            .generate(GenerateRequest::new(two_projects(), rooms(), calendar()))
            .unwrap();

        let reopened = SchedulingService::open(Arc::clone(&store), rooms(), calendar()).unwrap();
        assert_eq!(reopened.tracker.lock().unwrap().session_count(), 2);

        // Same answer from the replayed ledger as from the live one
        let live = first.book_manual(&project("P4", "T1", "T9", "T10"), date(1), hm(8, 0), None);
        let replayed =
            reopened.book_manual(&project("P4", "T1", "T9", "T10"), date(1), hm(8, 0), None);
        assert!(matches!(live, Err(SchedulingError::RoomConflict { .. })));
        assert!(matches!(replayed, Err(SchedulingError::RoomConflict { .. })));
    }

    #[test]
    fn test_failed_update_restores_ledger() {
        let service = SchedulingService::open(FlakyStore::default(), rooms(), calendar()).unwrap();
        service
            .generate(GenerateRequest::new(two_projects(), rooms(), calendar()))
            .unwrap();

        service.store().fail_writes.store(true, Ordering::SeqCst);
        let err = service.move_session("def-P1", date(2)).unwrap_err();
        assert!(matches!(err, SchedulingError::Storage(_)));
        assert!(!err.is_recoverable());

        let tracker = service.tracker.lock().unwrap();
        assert!(tracker.occupancy(date(2)).is_empty());
        assert!(!tracker.is_person_free("T1", date(1), &TimeWindow::new(480, 540)));
        drop(tracker);

        assert_eq!(service.store().get("def-P1").unwrap().unwrap().date, date(1));
    }

    #[test]
    fn test_failed_insert_leaves_nothing_reserved() {
        let service = SchedulingService::open(FlakyStore::default(), rooms(), calendar()).unwrap();
        service.store().fail_writes.store(true, Ordering::SeqCst);

        let result = service.generate(GenerateRequest::new(two_projects(), rooms(), calendar()));
        assert!(matches!(result, Err(SchedulingError::Storage(_))));
        assert_eq!(service.tracker.lock().unwrap().session_count(), 0);

        let manual =
            service.book_manual(&project("P4", "T9", "T10", "T11"), date(2), hm(8, 0), None);
        assert!(manual.is_err());
        assert_eq!(service.tracker.lock().unwrap().session_count(), 0);
    }

    #[test]
    fn test_failed_delete_keeps_booking() {
        let service = SchedulingService::open(FlakyStore::default(), rooms(), calendar()).unwrap();
        service
            .generate(GenerateRequest::new(two_projects(), rooms(), calendar()))
            .unwrap();

        service.store().fail_writes.store(true, Ordering::SeqCst);
        assert!(service.delete_session("def-P1").is_err());
        assert!(service.tracker.lock().unwrap().is_reserved("def-P1"));
    }

    #[test]
    fn test_parallel_moves_do_not_clash() {
        let service = service_with(vec![
            project("P1", "T1", "T2", "T3"),
            project("P2", "T4", "T5", "T6"),
            project("P3", "T7", "T8", "T9"),
            project("P4", "T1", "T10", "T11"),
        ]);

        std::thread::scope(|scope| {
            for (id, day) in [("def-P1", 2), ("def-P2", 2), ("def-P3", 3), ("def-P4", 3)] {
                let service = &service;
                scope.spawn(move || {
                    let _ = service.move_session(id, date(day));
                });
            }
        });

        let timetable = service.timetable().unwrap();
        assert_eq!(timetable.len(), 4);
        assert!(timetable.clashes().is_empty());
        assert!(timetable.min_same_room_gap().map_or(true, |gap| gap >= 60));
    }

    #[test]
    fn test_extreme_calendar_keeps_service_usable() {
        let cal = calendar().with_break_minutes(u32::MAX - 100);
        let service = SchedulingService::open(MemoryStore::new(), rooms(), cal.clone()).unwrap();
        let outcome = service
            .generate(GenerateRequest::new(two_projects(), rooms(), cal))
            .unwrap();
        assert!(outcome.is_complete());
        assert_eq!(service.move_session("def-P1", date(2)).unwrap().date, date(2));

        let cal = calendar().with_session_minutes(u32::MAX);
        let outcome = service
            .generate(GenerateRequest::new(
                vec![project("P3", "T7", "T8", "T9")],
                rooms(),
                cal,
            ))
            .unwrap();
        assert_eq!(outcome.unassigned.len(), 1);

        let err = service.edit_session_time("def-P2", hm(9, 0)).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideWorkingHours { .. }));
    }

    #[test]
    fn test_busy_co_supervisor_blocks_manual_booking() {
        let service = service_with(two_projects());
        service.move_session("def-P1", date(2)).unwrap();
        let p3 = Project::new(
            "P3",
            "Project P3",
            Jury::new("T7", "T8"),
            Supervision::new("T9").with_co_supervisor("T4"),
        );

        let err = service
            .book_manual(&p3, date(1), hm(8, 0), None)
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::PersonConflict { ref person_id, ref blocking_session }
                if person_id == "T4" && blocking_session == "def-P2"
        ));
        let booked = service.book_manual(&p3, date(1), hm(10, 0), None).unwrap();
        assert_eq!(booked.persons, vec!["T7", "T8", "T9", "T4"]);
    }

    #[test]
    fn test_idle_date_locks_dropped() {
        let service = service_with(two_projects());
        service.move_session("def-P1", date(2)).unwrap();
        service.move_session("def-P2", date(3)).unwrap();

        let held = service.date_locks.handles(&[date(9)]).unwrap();
        let locks = service.date_locks.locks.lock().unwrap();
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key(&date(9)));
        drop(held);
    }

    #[test]
    fn test_configure_changes_rooms() {
        let service = service_with(two_projects());
        service
            .configure(vec![Room::named("R3")], calendar())
            .unwrap();
        assert_eq!(service.rooms().unwrap(), vec![Room::named("R3")]);

        let moved = service.move_session("def-P1", date(2)).unwrap();
        assert_eq!(moved.room_id, "R3");
        assert!(service.configure(Vec::new(), calendar()).is_err());
    }
}
