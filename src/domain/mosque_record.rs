//! Mosque import records parsed from the fixed-column CSV export.
//!
//! The export has 38 columns. Only the first 22 carry data the directory
//! stores; the rest (madrassah, social links, notes, region, ...) are read
//! past. Rows shorter than [`MIN_COLUMNS`] are rejected, shorter rows that
//! do reach the postcode simply leave trailing fields empty.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::csv_line::split_csv_line;
use super::postcode::{Coordinates, normalise_postcode};

/// Number of columns in the export.
pub const EXPORT_COLUMNS: usize = 38;

/// Rows must reach at least the postcode column.
pub const MIN_COLUMNS: usize = 4;

mod col {
    pub const NAME: usize = 0;
    pub const ADDRESS: usize = 1;
    pub const CITY: usize = 2;
    pub const POSTCODE: usize = 3;
    pub const LONGITUDE: usize = 4;
    pub const LATITUDE: usize = 5;
    pub const PHONE: usize = 6;
    pub const EMAIL: usize = 7;
    pub const WEBSITE: usize = 8;
    pub const CAPACITY: usize = 9;
    pub const USAGE: usize = 10;
    pub const DENOMINATION: usize = 11;
    pub const MANAGEMENT: usize = 12;
    pub const WHEELCHAIR: usize = 13;
    pub const WUDU: usize = 14;
    pub const WOMEN: usize = 15;
    pub const PARKING: usize = 16;
    pub const TARAWIH: usize = 17;
    pub const QIYAM: usize = 18;
    pub const SERVICES: usize = 19;
    pub const JUMUAH: usize = 20;
    pub const LANGUAGES: usize = 21;
}

const SENTINELS: &[&str] = &[
    "unavailable",
    "not known",
    "unknown",
    "n/a",
    "na",
    "-",
    "none given",
    "not available",
];

/// How a building is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// Purpose-built or dedicated mosque.
    Mosque,
    /// Prayer room or prayer hall inside another building.
    PrayerRoom,
    /// Islamic centre with prayer space.
    IslamicCentre,
    /// Anything else the export lists.
    Other,
}

impl UsageType {
    fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("prayer") {
            Self::PrayerRoom
        } else if lower.contains("centre") || lower.contains("center") {
            Self::IslamicCentre
        } else if lower.contains("mosque") || lower.contains("masjid") {
            Self::Mosque
        } else {
            Self::Other
        }
    }

    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mosque => "mosque",
            Self::PrayerRoom => "prayer_room",
            Self::IslamicCentre => "islamic_centre",
            Self::Other => "other",
        }
    }
}

/// Parking available to worshippers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParkingType {
    /// Free car park on site.
    OnSite,
    /// Street parking only.
    Street,
    /// Paid parking nearby.
    Paid,
    /// No parking.
    NoParking,
}

impl ParkingType {
    fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if matches!(lower.as_str(), "no" | "none" | "no parking") {
            Some(Self::NoParking)
        } else if lower.contains("street") {
            Some(Self::Street)
        } else if lower.contains("paid") || lower.contains("pay ") {
            Some(Self::Paid)
        } else if lower == "yes"
            || lower.contains("on site")
            || lower.contains("on-site")
            || lower.contains("onsite")
            || lower.contains("car park")
            || lower.contains("free")
        {
            Some(Self::OnSite)
        } else {
            None
        }
    }

    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnSite => "on_site",
            Self::Street => "street",
            Self::Paid => "paid",
            Self::NoParking => "none",
        }
    }
}

/// How tarawih is prayed during Ramadan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TarawihStyle {
    /// Eight rakah.
    EightRakah,
    /// Twenty rakah.
    TwentyRakah,
    /// Tarawih is not held.
    NotOffered,
}

impl TarawihStyle {
    fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("20") || lower.contains("twenty") {
            Some(Self::TwentyRakah)
        } else if lower.contains('8') || lower.contains("eight") {
            Some(Self::EightRakah)
        } else if matches!(lower.as_str(), "no" | "none" | "not offered" | "n") {
            Some(Self::NotOffered)
        } else {
            None
        }
    }

    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EightRakah => "8_rakah",
            Self::TwentyRakah => "20_rakah",
            Self::NotOffered => "not_offered",
        }
    }
}

/// One mosque parsed from a CSV data line.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MosqueImportRecord {
    /// 1-based line number in the uploaded file.
    pub line: usize,
    /// Mosque name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// Town or city.
    pub city: Option<String>,
    /// Normalised postcode.
    pub postcode: Option<String>,
    /// Longitude, present only when the export or geocoder supplied one.
    pub longitude: Option<f64>,
    /// Latitude, present only when the export or geocoder supplied one.
    pub latitude: Option<f64>,
    /// First listed phone number.
    pub phone: Option<String>,
    /// First listed email address.
    pub email: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Worshipper capacity.
    pub capacity: Option<u32>,
    /// Usage classification.
    pub usage: Option<UsageType>,
    /// Denomination or theological leaning.
    pub denomination: Option<String>,
    /// Managing organisation.
    pub management: Option<String>,
    /// Step-free access.
    pub wheelchair_access: Option<bool>,
    /// Dedicated wudu area.
    pub wudu_facilities: Option<bool>,
    /// Space for women.
    pub women_facilities: Option<bool>,
    /// Parking type.
    pub parking: Option<ParkingType>,
    /// Ramadan tarawih style.
    pub tarawih: Option<TarawihStyle>,
    /// Whether qiyamul layl is held in the last ten nights.
    pub qiyamul_layl: Option<bool>,
    /// Free-text services list.
    pub services: Vec<String>,
    /// Jumuah times as printed.
    pub jumuah_times: Option<String>,
    /// Languages of the khutbah and classes.
    pub languages: Vec<String>,
}

impl MosqueImportRecord {
    /// Coordinates, when both halves are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.latitude
            .zip(self.longitude)
            .and_then(|(lat, lon)| Coordinates::checked(lat, lon))
    }

    /// Fills in coordinates from the geocoder.
    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = Some(coordinates.latitude);
        self.longitude = Some(coordinates.longitude);
    }
}

/// A record ready for insertion: coordinates resolved, slug allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMosque {
    /// Globally unique URL slug.
    pub slug: String,
    /// Resolved coordinates.
    pub coordinates: Coordinates,
    /// Parsed CSV data.
    pub record: MosqueImportRecord,
}

/// Denomination-based exclusion applied while parsing.
///
/// A row is excluded when its denomination contains any listed term,
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    terms: Vec<String>,
}

impl ExclusionPolicy {
    /// Builds a policy from raw terms; blank terms are dropped.
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// A policy that excludes nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self { terms: Vec::new() }
    }

    /// Returns the matching term if `denomination` is excluded.
    #[must_use]
    pub fn matching_term(&self, denomination: Option<&str>) -> Option<&str> {
        let lower = denomination?.to_lowercase();
        self.terms
            .iter()
            .find(|term| lower.contains(term.as_str()))
            .map(String::as_str)
    }
}

/// Why a line did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    /// The line ends before the postcode column.
    TooFewColumns {
        /// Number of fields found.
        found: usize,
    },
    /// The name column is empty.
    MissingName,
    /// The exclusion policy matched the denomination.
    Excluded {
        /// Denomination as written in the export.
        denomination: String,
    },
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewColumns { found } => write!(
                f,
                "expected at least {MIN_COLUMNS} of {EXPORT_COLUMNS} columns, found {found}"
            ),
            Self::MissingName => write!(f, "mosque name is empty"),
            Self::Excluded { denomination } => {
                write!(f, "excluded by denomination policy ({denomination})")
            }
        }
    }
}

/// A line that failed to parse, with enough context to find it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RowError {
    /// 1-based line number in the uploaded file.
    pub line: usize,
    /// Name column, when there was one.
    pub name: Option<String>,
    /// Failure reason.
    pub reason: RowErrorKind,
}

/// Parses one data line into a record.
///
/// # Errors
///
/// Returns a [`RowError`] carrying `line` when the row is too short, has
/// no name, or is excluded by `policy`.
pub fn parse_mosque_line(
    line: usize,
    raw: &str,
    policy: &ExclusionPolicy,
) -> Result<MosqueImportRecord, RowError> {
    let fields = split_csv_line(raw);
    let cell = |idx: usize| fields.get(idx).and_then(|v| clean(v));

    if fields.len() < MIN_COLUMNS {
        return Err(RowError {
            line,
            name: cell(col::NAME),
            reason: RowErrorKind::TooFewColumns {
                found: fields.len(),
            },
        });
    }

    let Some(name) = cell(col::NAME) else {
        return Err(RowError {
            line,
            name: None,
            reason: RowErrorKind::MissingName,
        });
    };

    let denomination = cell(col::DENOMINATION);
    if policy.matching_term(denomination.as_deref()).is_some() {
        return Err(RowError {
            line,
            name: Some(name),
            reason: RowErrorKind::Excluded {
                denomination: denomination.unwrap_or_default(),
            },
        });
    }

    let coordinates = cell(col::LATITUDE)
        .and_then(|v| v.parse::<f64>().ok())
        .zip(cell(col::LONGITUDE).and_then(|v| v.parse::<f64>().ok()))
        .and_then(|(lat, lon)| Coordinates::checked(lat, lon));

    Ok(MosqueImportRecord {
        line,
        name,
        address: cell(col::ADDRESS),
        city: cell(col::CITY),
        postcode: cell(col::POSTCODE).and_then(|v| normalise_postcode(&v)),
        longitude: coordinates.map(|c| c.longitude),
        latitude: coordinates.map(|c| c.latitude),
        phone: cell(col::PHONE).and_then(|v| first_value(&v)),
        email: cell(col::EMAIL).and_then(|v| first_value(&v)),
        website: cell(col::WEBSITE),
        capacity: cell(col::CAPACITY).and_then(|v| leading_number(&v)),
        usage: cell(col::USAGE).map(|v| UsageType::parse(&v)),
        denomination,
        management: cell(col::MANAGEMENT),
        wheelchair_access: cell(col::WHEELCHAIR).and_then(|v| parse_flag(&v)),
        wudu_facilities: cell(col::WUDU).and_then(|v| parse_flag(&v)),
        women_facilities: cell(col::WOMEN).and_then(|v| parse_flag(&v)),
        parking: cell(col::PARKING).and_then(|v| ParkingType::parse(&v)),
        tarawih: cell(col::TARAWIH).and_then(|v| TarawihStyle::parse(&v)),
        qiyamul_layl: cell(col::QIYAM).and_then(|v| parse_flag(&v)),
        services: cell(col::SERVICES).map(|v| split_list(&v)).unwrap_or_default(),
        jumuah_times: cell(col::JUMUAH),
        languages: cell(col::LANGUAGES).map(|v| split_list(&v)).unwrap_or_default(),
    })
}

/// Trims a cell and maps sentinel "no data" values to `None`.
fn clean(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if SENTINELS.contains(&lower.as_str()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// First entry of a multi-valued phone or email cell.
fn first_value(raw: &str) -> Option<String> {
    raw.split([';', '/', ',', '\n'])
        .flat_map(|part| part.split(" or "))
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

/// First integer in the cell, accepting `1,200` style grouping.
fn leading_number(raw: &str) -> Option<u32> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "available" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
