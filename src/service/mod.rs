//! Service layer: business logic orchestration.
//!
//! [`ImportService`] turns CSV exports into mosque rows and
//! [`TimetableService`] drives AI extraction and timetable storage. Both
//! reach the outside world only through the ports in
//! [`crate::domain::ports`].

pub mod import_service;
pub mod timetable_service;

pub use import_service::{ImportOutcome, ImportRequest, ImportService};
pub use timetable_service::TimetableService;
