//! Defense scheduling domain models.
//!
//! Provides the core data types: what must be scheduled (projects),
//! where (rooms), when (calendar configuration and its slots), and the
//! result (defense sessions).
//!
//! # Domain Mapping
//!
//! | pfe-schedule | Generic scheduling |
//! |--------------|--------------------|
//! | Project | Task with one activity |
//! | Room | Primary resource |
//! | Jury member / supervisor | Human resource |
//! | DefenseSession | Assignment |
//! | Timetable | Schedule |

mod calendar;
mod project;
mod room;
mod session;

pub use calendar::{minute_of_day, CalendarConfig, Slot, SlotIter, TimeWindow};
pub use project::{Jury, JuryRole, Project, Supervision};
pub use room::Room;
pub use session::{session_id_for, DefenseSession, SessionOrigin, Timetable};
