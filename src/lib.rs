//! Defense session scheduling for end-of-study projects.
//!
//! Places one defense per project into a finite timeline of
//! (date, time window, room) slots so that no room, jury member or
//! supervisor is ever double-booked, then keeps that guarantee through
//! operator moves, time edits, manual bookings and deletions.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Project`, `Room`, `CalendarConfig`,
//!   `Slot`, `DefenseSession`, `Timetable`
//! - **`validation`**: Input integrity checks (hours, durations, rooms,
//!   duplicate ids, student groups)
//! - **`availability`**: Per-date occupancy ledger of rooms and persons
//! - **`scheduler`**: Greedy `AssignmentEngine`, `RescheduleValidator`,
//!   `GenerationSummary`
//! - **`store`**: `ScheduleStore` trait with in-memory and JSONL backends
//! - **`service`**: `SchedulingService`, the locked, persistence-coupled
//!   operator operations
//! - **`jobs`**: Background generation over tokio
//! - **`config`**: YAML settings
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pfe_schedule::models::{CalendarConfig, Jury, Project, Room, Supervision};
//! use pfe_schedule::scheduler::GenerateRequest;
//! use pfe_schedule::service::SchedulingService;
//! use pfe_schedule::store::MemoryStore;
//!
//! let calendar = CalendarConfig::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
//! let rooms = vec![Room::named("Amphi A")];
//! let service = SchedulingService::open(MemoryStore::new(), rooms.clone(), calendar.clone())?;
//!
//! let projects = vec![
//!     Project::new("P1", "Telemetry", Jury::new("T1", "T2"), Supervision::new("T3"))
//!         .with_student("S1"),
//! ];
//! let outcome = service.generate(GenerateRequest::new(projects, rooms, calendar))?;
//! assert!(outcome.is_complete());
//!
//! let moved = service.move_session("def-P1", NaiveDate::from_ymd_opt(2026, 6, 2).unwrap())?;
//! assert_eq!(moved.room_id, "Amphi A");
//! # Ok::<(), pfe_schedule::SchedulingError>(())
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod availability;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{Result, SchedulingError};
