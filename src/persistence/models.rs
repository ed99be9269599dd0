//! Row shapes read back from PostgreSQL.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::timetable::MonthlyTimetable;

/// A row from the `prayer_timetables` table, as fetched by `query_as`.
pub type TimetableRow = (
    Uuid,
    Uuid,
    i32,
    i32,
    serde_json::Value,
    serde_json::Value,
    DateTime<Utc>,
);

/// Converts a [`TimetableRow`] into the domain type.
///
/// # Errors
///
/// Returns [`RepositoryError::Query`] when the stored JSON no longer
/// matches the timetable shape or the month is negative.
pub fn timetable_from_row(row: TimetableRow) -> Result<MonthlyTimetable, RepositoryError> {
    let (id, mosque_id, month, year, monthly_times, special_dates, updated_at) = row;
    Ok(MonthlyTimetable {
        id,
        mosque_id,
        month: u32::try_from(month).map_err(|e| malformed(id, "month", e))?,
        year,
        monthly_times: serde_json::from_value(monthly_times)
            .map_err(|e| malformed(id, "monthly_times", e))?,
        special_dates: serde_json::from_value(special_dates)
            .map_err(|e| malformed(id, "special_dates", e))?,
        updated_at,
    })
}

fn malformed(id: Uuid, what: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Query {
        message: format!("stored {what} for timetable {id} is malformed: {err}"),
    }
}
