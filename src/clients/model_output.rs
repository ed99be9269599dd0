//! Lenient decoding of the vision model's timetable JSON.
//!
//! Models drift from the requested shape: dates instead of day numbers,
//! bare strings instead of slot objects, numbers as strings. Only a missing
//! month or year fails the extraction. Any other value that cannot be used
//! is dropped and reported in `warnings` for the reviewer.

use chrono::{Datelike, Month, NaiveDate};
use serde_json::{Map, Value};

use crate::domain::ports::ExtractionError;
use crate::domain::timetable::{
    DailyTimes, ExtractedTimetable, Prayer, PrayerSlot, SpecialDate, merge_warnings,
};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const ADHAN_KEYS: [&str; 3] = ["adhan", "begins", "start"];
const IQAMAH_KEYS: [&str; 3] = ["iqamah", "jamaah", "jamat"];

/// Builds a timetable from the model's JSON object.
pub(crate) fn decode_timetable(value: Value) -> Result<ExtractedTimetable, ExtractionError> {
    let Value::Object(mut root) = value else {
        return Err(unparseable("model output is not a JSON object"));
    };
    let month = root
        .get("month")
        .and_then(month_number)
        .ok_or_else(|| unparseable("model output has no usable month"))?;
    let year = root
        .get("year")
        .and_then(year_number)
        .ok_or_else(|| unparseable("model output has no usable year"))?;

    let mut notes = Vec::new();
    let rows = take_array(&mut root, "monthly_times", &mut notes);
    let monthly_times = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| decode_row(index + 1, row, &mut notes))
        .collect();
    let entries = take_array(&mut root, "special_dates", &mut notes);
    let special_dates = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value::<SpecialDate>(entry)
                .map_err(|e| notes.push(format!("special date {}: ignored ({e})", index + 1)))
                .ok()
        })
        .collect();
    let model_warnings = take_array(&mut root, "warnings", &mut notes)
        .into_iter()
        .map(|w| match w {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();

    Ok(ExtractedTimetable {
        month,
        year,
        monthly_times,
        special_dates,
        warnings: merge_warnings(model_warnings, notes),
    })
}

fn unparseable(message: &str) -> ExtractionError {
    ExtractionError::Unparseable {
        message: message.to_string(),
    }
}

/// Removes `key` as an array. Null or absent is empty.
fn take_array(
    root: &mut Map<String, Value>,
    key: &str,
    notes: &mut Vec<String>,
) -> Vec<Value> {
    match root.remove(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            notes.push(format!("{key}: not a list, ignored"));
            Vec::new()
        }
    }
}

fn integer(value: &Value) -> Option<u32> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_u64().and_then(|n| u32::try_from(n).ok()),
    }
}

fn month_number(value: &Value) -> Option<u32> {
    let month = integer(value).or_else(|| {
        value
            .as_str()
            .and_then(|name| name.trim().parse::<Month>().ok())
            .map(|m| m.number_from_month())
    })?;
    (1..=12).contains(&month).then_some(month)
}

fn year_number(value: &Value) -> Option<i32> {
    integer(value).and_then(|year| i32::try_from(year).ok())
}

/// Day of month from a number, a numeric string, or a printed date.
fn day_number(value: &Value) -> Option<u32> {
    let day = integer(value).or_else(|| {
        let text = value.as_str()?.trim();
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(|date| date.day())
    })?;
    (1..=31).contains(&day).then_some(day)
}

fn decode_row(position: usize, row: Value, notes: &mut Vec<String>) -> Option<DailyTimes> {
    let Value::Object(fields) = row else {
        notes.push(format!("row {position}: not an object, skipped"));
        return None;
    };
    let Some(day) = fields.get("day").or_else(|| fields.get("date")).and_then(day_number) else {
        notes.push(format!("row {position}: no usable day, skipped"));
        return None;
    };

    let mut times = DailyTimes {
        day,
        ..DailyTimes::default()
    };
    for prayer in Prayer::CANONICAL {
        *times.slot_mut(prayer) = decode_slot(day, prayer, fields.get(prayer.name()), notes);
    }
    times.jumuah = match fields.get("jumuah") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            notes.push(format!("day {day}: jumuah value {other} ignored"));
            None
        }
    };
    Some(times)
}

/// A slot object, or a bare string taken as the adhan.
fn decode_slot(
    day: u32,
    prayer: Prayer,
    value: Option<&Value>,
    notes: &mut Vec<String>,
) -> PrayerSlot {
    match value {
        None | Some(Value::Null) => PrayerSlot::default(),
        Some(Value::String(text)) => PrayerSlot {
            adhan: Some(text.clone()),
            iqamah: None,
        },
        Some(Value::Object(fields)) => PrayerSlot {
            adhan: slot_time(day, prayer, "adhan", first_of(fields, &ADHAN_KEYS), notes),
            iqamah: slot_time(day, prayer, "iqamah", first_of(fields, &IQAMAH_KEYS), notes),
        },
        Some(other) => {
            notes.push(format!("day {day}: {prayer} value {other} ignored"));
            PrayerSlot::default()
        }
    }
}

fn first_of<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| fields.get(*key))
}

fn slot_time(
    day: u32,
    prayer: Prayer,
    kind: &str,
    value: Option<&Value>,
    notes: &mut Vec<String>,
) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => {
            notes.push(format!("day {day}: {prayer} {kind} value {other} ignored"));
            None
        }
    }
}
