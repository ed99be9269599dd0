//! Driven port for monthly prayer timetables.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::timetable::{MonthlyTimetable, TimetableUpsert};

/// Port for the `prayer_timetables` table, keyed by (mosque, month, year).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Loads the stored timetable for one mosque and month.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on database failure.
    async fn find(
        &self,
        mosque_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlyTimetable>, RepositoryError>;

    /// Inserts or replaces the timetable for `(mosque_id, month, year)`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on database failure.
    async fn upsert(&self, timetable: &TimetableUpsert)
    -> Result<MonthlyTimetable, RepositoryError>;
}
