//! Domain layer: import records, slugs, timetables, and ports.
//!
//! Everything here is synchronous and free of I/O except the port traits,
//! which the services call and the adapters implement.

pub mod csv_line;
pub mod mosque_record;
pub mod ports;
pub mod postcode;
pub mod slug;
pub mod timetable;

pub use mosque_record::{ExclusionPolicy, MosqueImportRecord, NewMosque, RowError};
pub use postcode::Coordinates;
pub use slug::SlugAllocator;
pub use timetable::{ExtractedTimetable, MonthlyTimetable};
