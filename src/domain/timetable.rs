//! Monthly prayer timetables and the advisory validator.
//!
//! Extracted timetables are never rejected for bad content. The validator
//! only produces warnings for an admin to resolve in the review screen; the
//! timetable itself passes through untouched.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The daily prayer slots in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    /// Dawn prayer.
    Fajr,
    /// Sunrise; not a prayer, but printed on every timetable.
    Sunrise,
    /// Midday prayer.
    Dhuhr,
    /// Afternoon prayer.
    Asr,
    /// Sunset prayer.
    Maghrib,
    /// Night prayer.
    Isha,
}

impl Prayer {
    /// Canonical daily order.
    pub const CANONICAL: [Self; 6] = [
        Self::Fajr,
        Self::Sunrise,
        Self::Dhuhr,
        Self::Asr,
        Self::Maghrib,
        Self::Isha,
    ];

    /// Lowercase name used in JSON and warnings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fajr => "fajr",
            Self::Sunrise => "sunrise",
            Self::Dhuhr => "dhuhr",
            Self::Asr => "asr",
            Self::Maghrib => "maghrib",
            Self::Isha => "isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Jurisprudential school, used to pick the Asr column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Madhab {
    /// Later Asr (shadow twice the object length).
    Hanafi,
    /// Earlier Asr (shadow equal to object length). Also covers Maliki and
    /// Hanbali timetables.
    #[default]
    #[serde(alias = "shafii", alias = "shafi'i", alias = "standard")]
    Shafi,
}

/// Which prompt variant the extractor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// A regular monthly timetable.
    #[default]
    Monthly,
    /// A Ramadan timetable with suhoor and iftar annotations.
    Ramadan,
}

/// Adhan and iqamah time for one prayer, both `HH:MM`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrayerSlot {
    /// Call to prayer.
    #[serde(default)]
    pub adhan: Option<String>,
    /// Start of the congregation.
    #[serde(default)]
    pub iqamah: Option<String>,
}

/// One row of a monthly timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyTimes {
    /// Day of the month.
    #[serde(alias = "date")]
    pub day: u32,
    /// Fajr times.
    #[serde(default)]
    pub fajr: PrayerSlot,
    /// Sunrise time (adhan only).
    #[serde(default)]
    pub sunrise: PrayerSlot,
    /// Dhuhr times.
    #[serde(default)]
    pub dhuhr: PrayerSlot,
    /// Asr times.
    #[serde(default)]
    pub asr: PrayerSlot,
    /// Maghrib times.
    #[serde(default)]
    pub maghrib: PrayerSlot,
    /// Isha times.
    #[serde(default)]
    pub isha: PrayerSlot,
    /// Jumuah time, on Fridays.
    #[serde(default)]
    pub jumuah: Option<String>,
}

impl DailyTimes {
    /// The slot for `prayer`.
    #[must_use]
    pub const fn slot(&self, prayer: Prayer) -> &PrayerSlot {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }

    /// Mutable access to the slot for `prayer`.
    pub fn slot_mut(&mut self, prayer: Prayer) -> &mut PrayerSlot {
        match prayer {
            Prayer::Fajr => &mut self.fajr,
            Prayer::Sunrise => &mut self.sunrise,
            Prayer::Dhuhr => &mut self.dhuhr,
            Prayer::Asr => &mut self.asr,
            Prayer::Maghrib => &mut self.maghrib,
            Prayer::Isha => &mut self.isha,
        }
    }
}

/// A notable date printed on the timetable (Eid, first of Ramadan, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SpecialDate {
    /// Date as printed, ideally `YYYY-MM-DD`.
    pub date: String,
    /// Short label.
    #[serde(alias = "description")]
    pub label: String,
    /// Free-text note, e.g. suhoor and iftar times.
    #[serde(default)]
    pub note: Option<String>,
}

/// A month of prayer times as read by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedTimetable {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Gregorian year.
    pub year: i32,
    /// One entry per day.
    #[serde(default)]
    pub monthly_times: Vec<DailyTimes>,
    /// Notable dates.
    #[serde(default)]
    pub special_dates: Vec<SpecialDate>,
    /// Warnings from the model and the validator.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A stored monthly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTimetable {
    /// Row id.
    pub id: Uuid,
    /// Owning mosque.
    pub mosque_id: Uuid,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Gregorian year.
    pub year: i32,
    /// One entry per day.
    pub monthly_times: Vec<DailyTimes>,
    /// Notable dates.
    pub special_dates: Vec<SpecialDate>,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}

/// Write model for [`MonthlyTimetable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableUpsert {
    /// Owning mosque.
    pub mosque_id: Uuid,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Gregorian year.
    pub year: i32,
    /// One entry per day.
    pub monthly_times: Vec<DailyTimes>,
    /// Notable dates.
    pub special_dates: Vec<SpecialDate>,
}

/// Parses a strict 24-hour `HH:MM` string.
#[must_use]
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let [h1, h2, b':', m1, m2] = value.as_bytes() else {
        return None;
    };
    if ![h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = u32::from((h1 - b'0') * 10 + (h2 - b'0'));
    let minute = u32::from((m1 - b'0') * 10 + (m2 - b'0'));
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Returns `true` for a strict 24-hour `HH:MM` string.
#[must_use]
pub fn is_valid_time(value: &str) -> bool {
    parse_time(value).is_some()
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt().map(|last| last.day())
}

/// Checks an extracted timetable and returns warnings. Never fails.
#[must_use]
pub fn validate_timetable(timetable: &ExtractedTimetable) -> Vec<String> {
    validate_month(timetable.year, timetable.month, &timetable.monthly_times)
}

/// Checks a month of daily rows: calendar bounds, duplicates, and each
/// day's formats and ordering.
#[must_use]
pub fn validate_month(year: i32, month: u32, days: &[DailyTimes]) -> Vec<String> {
    let mut warnings = Vec::new();

    let month_len = days_in_month(year, month);
    if month_len.is_none() {
        warnings.push(format!(
            "month {month} of {year} is not a valid calendar month"
        ));
    }

    let mut seen = HashSet::new();
    for day in days {
        if let Some(len) = month_len
            && !(1..=len).contains(&day.day)
        {
            warnings.push(format!(
                "day {}: outside month {month} which has {len} days",
                day.day
            ));
        }
        if !seen.insert(day.day) {
            warnings.push(format!("day {}: appears more than once", day.day));
        }
        warnings.extend(validate_day(day));
    }

    warnings
}

/// Format and ordering warnings for one day.
#[must_use]
pub fn validate_day(day: &DailyTimes) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut ordered: Vec<(Prayer, &str, NaiveTime)> = Vec::with_capacity(Prayer::CANONICAL.len());

    for prayer in Prayer::CANONICAL {
        let slot = day.slot(prayer);
        let adhan = check_format(day.day, prayer, "adhan", slot.adhan.as_deref(), &mut warnings);
        let iqamah = check_format(
            day.day,
            prayer,
            "iqamah",
            slot.iqamah.as_deref(),
            &mut warnings,
        );

        if let (Some((a_raw, a)), Some((i_raw, i))) = (adhan, iqamah)
            && i < a
        {
            warnings.push(format!(
                "day {}: {prayer} iqamah {i_raw} is earlier than adhan {a_raw}",
                day.day
            ));
        }
        if let Some((raw, time)) = adhan {
            ordered.push((prayer, raw, time));
        }
    }

    for pair in ordered.windows(2) {
        let [(pa, ra, ta), (pb, rb, tb)] = pair else {
            continue;
        };
        if tb < ta {
            warnings.push(format!(
                "day {}: {pa} ({ra}) is later than {pb} ({rb})",
                day.day
            ));
        }
    }

    if let Some(jumuah) = day.jumuah.as_deref()
        && !is_valid_time(jumuah)
    {
        warnings.push(format!(
            "day {}: jumuah time \"{jumuah}\" is not a valid HH:MM time",
            day.day
        ));
    }

    warnings
}

fn check_format<'a>(
    day: u32,
    prayer: Prayer,
    kind: &str,
    value: Option<&'a str>,
    warnings: &mut Vec<String>,
) -> Option<(&'a str, NaiveTime)> {
    let raw = value?;
    match parse_time(raw) {
        Some(time) => Some((raw, time)),
        None => {
            warnings.push(format!(
                "day {day}: {prayer} {kind} \"{raw}\" is not a valid HH:MM time"
            ));
            None
        }
    }
}

/// Appends `extra` to `base`, dropping repeats and keeping first-seen order.
#[must_use]
pub fn merge_warnings(base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    base.into_iter()
        .chain(extra)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn slot(adhan: &str) -> PrayerSlot {
        PrayerSlot {
            adhan: Some(adhan.to_string()),
            iqamah: None,
        }
    }

    fn day(times: [&str; 5]) -> DailyTimes {
        DailyTimes {
            day: 1,
            fajr: slot(times[0]),
            dhuhr: slot(times[1]),
            asr: slot(times[2]),
            maghrib: slot(times[3]),
            isha: slot(times[4]),
            ..DailyTimes::default()
        }
    }

    fn month(days: Vec<DailyTimes>) -> ExtractedTimetable {
        ExtractedTimetable {
            month: 6,
            year: 2025,
            monthly_times: days,
            special_dates: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[rstest]
    #[case("00:00", true)]
    #[case("23:59", true)]
    #[case("05:30", true)]
    #[case("24:00", false)]
    #[case("9:30", false)]
    #[case("13:60", false)]
    #[case("12:3a", false)]
    #[case("12-30", false)]
    #[case("", false)]
    fn time_format(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_time(value), valid);
    }

    #[test]
    fn increasing_day_has_no_warnings() {
        let d = day(["05:30", "13:00", "16:30", "19:45", "21:15"]);
        assert!(validate_day(&d).is_empty());
    }

    #[rstest]
    #[case(0, "fajr", "dhuhr")]
    #[case(1, "dhuhr", "asr")]
    #[case(2, "asr", "maghrib")]
    #[case(3, "maghrib", "isha")]
    fn adjacent_swap_gives_one_warning(
        #[case] idx: usize,
        #[case] first: &str,
        #[case] second: &str,
    ) {
        let mut times = ["05:30", "13:00", "16:30", "19:45", "21:15"];
        times.swap(idx, idx + 1);
        let warnings = validate_day(&day(times));
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains(first));
        assert!(warnings[0].contains(second));
    }

    #[test]
    fn equal_times_are_not_an_inversion() {
        let d = day(["05:30", "13:00", "13:00", "19:45", "21:15"]);
        assert!(validate_day(&d).is_empty());
    }

    #[test]
    fn sunrise_participates_in_ordering() {
        let mut d = day(["05:30", "13:00", "16:30", "19:45", "21:15"]);
        d.sunrise = slot("05:00");
        let warnings = validate_day(&d);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("fajr (05:30) is later than sunrise (05:00)"));
    }

    #[test]
    fn bad_format_is_warned_and_skipped_for_ordering() {
        let d = day(["5:30", "13:00", "16:30", "19:45", "21:15"]);
        let warnings = validate_day(&d);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("fajr adhan \"5:30\""));
    }

    #[test]
    fn iqamah_before_adhan_is_warned() {
        let mut d = day(["05:30", "13:00", "16:30", "19:45", "21:15"]);
        d.dhuhr.iqamah = Some("12:45".to_string());
        let warnings = validate_day(&d);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("dhuhr iqamah 12:45"));
    }

    #[test]
    fn invalid_jumuah_is_warned() {
        let mut d = day(["05:30", "13:00", "16:30", "19:45", "21:15"]);
        d.jumuah = Some("1.30pm".to_string());
        assert_eq!(validate_day(&d).len(), 1);
    }

    #[test]
    fn day_outside_month_and_duplicates_are_warned() {
        let mut a = day(["05:30", "13:00", "16:30", "19:45", "21:15"]);
        a.day = 31;
        let b = a.clone();
        let warnings = validate_timetable(&month(vec![a, b]));
        assert!(warnings.iter().any(|w| w.contains("outside month 6")));
        assert!(warnings.iter().any(|w| w.contains("more than once")));
    }

    #[test]
    fn invalid_month_is_warned() {
        let mut t = month(Vec::new());
        t.month = 13;
        assert_eq!(validate_timetable(&t).len(), 1);
    }

    #[test]
    fn validation_leaves_input_untouched() {
        let t = month(vec![day(["05:30", "04:00", "16:30", "19:45", "21:15"])]);
        let before = t.clone();
        let _ = validate_timetable(&t);
        assert_eq!(t, before);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn merge_keeps_order_and_drops_repeats() {
        let merged = merge_warnings(
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string(), "c".to_string()],
        );
        assert_eq!(merged, vec!["a", "b", "c"]);
    }

    #[test]
    fn deserialises_model_output_with_aliases() {
        let json = r#"{
            "month": 3, "year": 2025,
            "monthly_times": [{"date": 1, "fajr": {"adhan": "05:10", "iqamah": "05:40"}}],
            "special_dates": [{"date": "2025-03-01", "description": "1st Ramadan"}]
        }"#;
        let Ok(t) = serde_json::from_str::<ExtractedTimetable>(json) else {
            panic!("should deserialise");
        };
        assert_eq!(t.monthly_times[0].day, 1);
        assert_eq!(t.special_dates[0].label, "1st Ramadan");
        assert!(t.warnings.is_empty());
    }
}
