//! PostgreSQL implementation of the mosque and timetable repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{TimetableRow, timetable_from_row};
use crate::domain::mosque_record::NewMosque;
use crate::domain::ports::{MosqueRepository, RepositoryError, TimetableRepository};
use crate::domain::timetable::{MonthlyTimetable, TimetableUpsert};

/// PostgreSQL-backed repositories using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::UniqueViolation {
                message: db.message().to_string(),
            }
        }
        _ => RepositoryError::Query {
            message: err.to_string(),
        },
    }
}

fn month_param(month: u32) -> Result<i32, RepositoryError> {
    i32::try_from(month).map_err(|_| RepositoryError::Query {
        message: format!("month {month} out of range"),
    })
}

const TIMETABLE_COLUMNS: &str =
    "id, mosque_id, month, year, monthly_times, special_dates, updated_at";

#[async_trait]
impl MosqueRepository for PostgresStore {
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        // Slugs only contain [a-z0-9-], so the prefix needs no LIKE escaping.
        sqlx::query_scalar::<_, String>("SELECT slug FROM mosques WHERE slug LIKE $1")
            .bind(format!("{prefix}%"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_mosque(&self, mosque: &NewMosque) -> Result<Uuid, RepositoryError> {
        let rec = &mosque.record;
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO mosques (slug, name, address, city, postcode, latitude, longitude, \
             phone, email, website, capacity, usage_type, denomination, management, \
             wheelchair_access, wudu_facilities, women_facilities, parking_type, tarawih_style, \
             qiyamul_layl, services, jumuah_times, languages) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23) RETURNING id",
        )
        .bind(&mosque.slug)
        .bind(&rec.name)
        .bind(&rec.address)
        .bind(&rec.city)
        .bind(&rec.postcode)
        .bind(mosque.coordinates.latitude)
        .bind(mosque.coordinates.longitude)
        .bind(&rec.phone)
        .bind(&rec.email)
        .bind(&rec.website)
        .bind(rec.capacity.and_then(|c| i32::try_from(c).ok()))
        .bind(rec.usage.map(|u| u.as_str()))
        .bind(&rec.denomination)
        .bind(&rec.management)
        .bind(rec.wheelchair_access)
        .bind(rec.wudu_facilities)
        .bind(rec.women_facilities)
        .bind(rec.parking.map(|p| p.as_str()))
        .bind(rec.tarawih.map(|t| t.as_str()))
        .bind(rec.qiyamul_layl)
        .bind(&rec.services)
        .bind(&rec.jumuah_times)
        .bind(&rec.languages)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TimetableRepository for PostgresStore {
    async fn find(
        &self,
        mosque_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlyTimetable>, RepositoryError> {
        let row = sqlx::query_as::<_, TimetableRow>(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM prayer_timetables \
             WHERE mosque_id = $1 AND month = $2 AND year = $3"
        ))
        .bind(mosque_id)
        .bind(month_param(month)?)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(timetable_from_row).transpose()
    }

    async fn upsert(
        &self,
        timetable: &TimetableUpsert,
    ) -> Result<MonthlyTimetable, RepositoryError> {
        let encode = |e: serde_json::Error| RepositoryError::Query {
            message: format!("timetable does not serialise: {e}"),
        };
        let monthly_times = serde_json::to_value(&timetable.monthly_times).map_err(encode)?;
        let special_dates = serde_json::to_value(&timetable.special_dates).map_err(encode)?;

        let row = sqlx::query_as::<_, TimetableRow>(&format!(
            "INSERT INTO prayer_timetables (mosque_id, month, year, monthly_times, special_dates) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (mosque_id, month, year) DO UPDATE SET \
             monthly_times = EXCLUDED.monthly_times, \
             special_dates = EXCLUDED.special_dates, \
             updated_at = now() \
             RETURNING {TIMETABLE_COLUMNS}"
        ))
        .bind(timetable.mosque_id)
        .bind(month_param(timetable.month)?)
        .bind(timetable.year)
        .bind(&monthly_times)
        .bind(&special_dates)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        timetable_from_row(row)
    }
}
