//! In-memory port implementations shared by service and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::mosque_record::NewMosque;
use crate::domain::ports::{
    GeocodeError, Geocoder, MosqueRepository, RepositoryError, TimetableRepository,
};
use crate::domain::postcode::{Coordinates, postcode_key};
use crate::domain::timetable::{MonthlyTimetable, TimetableUpsert};

/// Mosque table that enforces slug uniqueness like the real index.
#[derive(Debug, Default)]
pub struct InMemoryMosques {
    rows: Mutex<Vec<NewMosque>>,
}

impl InMemoryMosques {
    /// Store pre-seeded with existing slugs.
    pub fn with_slugs(slugs: &[&str]) -> Self {
        let rows = slugs
            .iter()
            .map(|slug| NewMosque {
                slug: (*slug).to_string(),
                coordinates: Coordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                record: crate::domain::mosque_record::MosqueImportRecord {
                    line: 0,
                    name: (*slug).to_string(),
                    address: None,
                    city: None,
                    postcode: None,
                    longitude: None,
                    latitude: None,
                    phone: None,
                    email: None,
                    website: None,
                    capacity: None,
                    usage: None,
                    denomination: None,
                    management: None,
                    wheelchair_access: None,
                    wudu_facilities: None,
                    women_facilities: None,
                    parking: None,
                    tarawih: None,
                    qiyamul_layl: None,
                    services: Vec::new(),
                    jumuah_times: None,
                    languages: Vec::new(),
                },
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Every stored slug, in insertion order.
    pub fn slugs(&self) -> Vec<String> {
        self.rows
            .lock()
            .map(|rows| rows.iter().map(|r| r.slug.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Query {
        message: "lock poisoned".to_string(),
    }
}

#[async_trait]
impl MosqueRepository for InMemoryMosques {
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows
            .iter()
            .filter(|r| r.slug.starts_with(prefix))
            .map(|r| r.slug.clone())
            .collect())
    }

    async fn insert_mosque(&self, mosque: &NewMosque) -> Result<Uuid, RepositoryError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        if rows.iter().any(|r| r.slug == mosque.slug) {
            return Err(RepositoryError::UniqueViolation {
                message: format!("slug {} exists", mosque.slug),
            });
        }
        rows.push(mosque.clone());
        Ok(Uuid::new_v4())
    }
}

/// Geocoder answering from a fixed table; unknown postcodes are misses.
#[derive(Debug, Default)]
pub struct FixedGeocoder {
    known: HashMap<String, Coordinates>,
    calls: Mutex<Vec<usize>>,
}

impl FixedGeocoder {
    /// Geocoder that knows exactly `entries`.
    pub fn new(entries: &[(&str, f64, f64)]) -> Self {
        let known = entries
            .iter()
            .map(|(pc, lat, lon)| {
                (
                    postcode_key(pc),
                    Coordinates {
                        latitude: *lat,
                        longitude: *lon,
                    },
                )
            })
            .collect();
        Self {
            known,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Batch sizes of every bulk call made so far.
    pub fn bulk_calls(&self) -> Vec<usize> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn lookup(&self, postcode: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(self.known.get(&postcode_key(postcode)).copied())
    }

    async fn bulk_lookup(
        &self,
        postcodes: &[String],
    ) -> Result<HashMap<String, Coordinates>, GeocodeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(postcodes.len());
        }
        Ok(postcodes
            .iter()
            .filter_map(|pc| {
                let key = postcode_key(pc);
                self.known.get(&key).map(|c| (key, *c))
            })
            .collect())
    }
}

/// Timetable table keyed by (mosque, month, year).
#[derive(Debug, Default)]
pub struct InMemoryTimetables {
    rows: Mutex<HashMap<(Uuid, u32, i32), MonthlyTimetable>>,
}

#[async_trait]
impl TimetableRepository for InMemoryTimetables {
    async fn find(
        &self,
        mosque_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlyTimetable>, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get(&(mosque_id, month, year)).cloned())
    }

    async fn upsert(
        &self,
        timetable: &TimetableUpsert,
    ) -> Result<MonthlyTimetable, RepositoryError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let key = (timetable.mosque_id, timetable.month, timetable.year);
        let id = rows.get(&key).map_or_else(Uuid::new_v4, |existing| existing.id);
        let stored = MonthlyTimetable {
            id,
            mosque_id: timetable.mosque_id,
            month: timetable.month,
            year: timetable.year,
            monthly_times: timetable.monthly_times.clone(),
            special_dates: timetable.special_dates.clone(),
            updated_at: Utc::now(),
        };
        rows.insert(key, stored.clone());
        Ok(stored)
    }
}
