//! REST endpoint handlers organized by resource.

pub mod geocode;
pub mod import;
pub mod system;
pub mod timetable;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(import::routes())
        .merge(timetable::routes())
        .merge(geocode::routes())
}
