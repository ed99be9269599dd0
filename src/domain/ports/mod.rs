//! Driven ports: the outbound seams the services depend on.
//!
//! Each port is an async trait so the HTTP and PostgreSQL adapters can be
//! swapped for fakes in tests.

pub mod geocoder;
pub mod mosque_repository;
pub mod timetable_extractor;
pub mod timetable_repository;

pub use geocoder::{GeocodeError, Geocoder};
pub use mosque_repository::{MosqueRepository, RepositoryError};
pub use timetable_extractor::{ExtractionError, ExtractionRequest, TimetableExtractor};
pub use timetable_repository::TimetableRepository;

#[cfg(test)]
pub use geocoder::MockGeocoder;
#[cfg(test)]
pub use mosque_repository::MockMosqueRepository;
#[cfg(test)]
pub use timetable_extractor::MockTimetableExtractor;
#[cfg(test)]
pub use timetable_repository::MockTimetableRepository;
