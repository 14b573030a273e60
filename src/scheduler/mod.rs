//! Defense session assignment and rescheduling.
//!
//! # Algorithm
//!
//! `AssignmentEngine` is a greedy, input-ordered, earliest-slot scheduler.
//! It is feasibility-driven, not an optimizer: every project takes the
//! first (slot, room) pair where the room and all its jury members and
//! supervisors are free.
//!
//! `RescheduleValidator` re-checks a single session against the same
//! ledger when an operator moves it, and either commits the move or
//! restores the original.
//!
//! # Summary
//!
//! `GenerationSummary` reports what a batch run achieved: counts, date
//! span and room utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod engine;
mod reschedule;
mod summary;

pub use engine::{
    AssignmentEngine, GenerateRequest, GenerationOutcome, Unassigned, UnassignedReason,
};
pub use reschedule::{RescheduleRequest, RescheduleValidator};
pub use summary::GenerationSummary;
