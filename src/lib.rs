//! # minaarly-gateway
//!
//! Back-office HTTP service for the Minaarly mosque directory.
//!
//! The admin UI calls this service for the work that does not fit a plain
//! CRUD screen: bulk CSV mosque imports, UK postcode geocoding, and reading
//! printed prayer timetables with a vision model. Pages, auth and the
//! directory itself live elsewhere.
//!
//! ## Architecture
//!
//! ```text
//! Admin UI (HTTP/JSON)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ImportService, TimetableService (service/)
//!     │
//!     ├── CSV parsing, slugs, timetable validator (domain/)
//!     ├── Ports (domain/ports)
//!     │
//!     ├── postcodes.io + AI gateway clients (clients/)
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
