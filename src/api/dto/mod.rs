//! Data Transfer Objects for REST request/response serialization.
//!
//! Import bodies are camelCase to match the admin UI; timetable and geocode
//! bodies are snake_case.

pub mod geocode_dto;
pub mod import_dto;
pub mod timetable_dto;

pub use geocode_dto::*;
pub use import_dto::*;
pub use timetable_dto::*;
