//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::ports::Geocoder;
use crate::service::{ImportService, TimetableService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// CSV import orchestration.
    pub import_service: Arc<ImportService>,
    /// Timetable extraction and storage.
    pub timetable_service: Arc<TimetableService>,
    /// Postcode lookups for the geocoding proxy.
    pub geocoder: Arc<dyn Geocoder>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("import_service", &self.import_service)
            .field("timetable_service", &self.timetable_service)
            .finish_non_exhaustive()
    }
}
