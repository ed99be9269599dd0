//! Prompt text for timetable extraction.

use crate::domain::ports::ExtractionRequest;
use crate::domain::timetable::{ExtractionMode, Madhab};

/// System prompt: role and output contract.
pub const SYSTEM_PROMPT: &str = "You read printed mosque prayer timetables and return them as JSON. \
Answer with a single JSON object and nothing else. \
Use 24-hour HH:MM times with leading zeros. \
If a value is missing or illegible, use null and add a short note to \"warnings\". \
Never invent times.";

const SCHEMA_HINT: &str = r#"Return exactly this shape:
{
  "month": <1-12>,
  "year": <four digit year>,
  "monthly_times": [
    {
      "day": <day of month>,
      "fajr":    {"adhan": "HH:MM" | null, "iqamah": "HH:MM" | null},
      "sunrise": {"adhan": "HH:MM" | null, "iqamah": null},
      "dhuhr":   {"adhan": "HH:MM" | null, "iqamah": "HH:MM" | null},
      "asr":     {"adhan": "HH:MM" | null, "iqamah": "HH:MM" | null},
      "maghrib": {"adhan": "HH:MM" | null, "iqamah": "HH:MM" | null},
      "isha":    {"adhan": "HH:MM" | null, "iqamah": "HH:MM" | null},
      "jumuah":  "HH:MM" | null
    }
  ],
  "special_dates": [{"date": "YYYY-MM-DD", "label": "...", "note": "..." | null}],
  "warnings": ["..."]
}"#;

/// User prompt for one extraction request.
#[must_use]
pub fn build_user_prompt(request: &ExtractionRequest) -> String {
    let asr = match request.madhab {
        Madhab::Hanafi => {
            "When two Asr columns are printed, use the later one (Hanafi, often labelled \
             \"Asr 2\" or \"Mithl 2\")."
        }
        Madhab::Shafi => {
            "When two Asr columns are printed, use the earlier one (Shafi'i, often labelled \
             \"Asr 1\" or \"Mithl 1\")."
        }
    };
    let mode = match request.mode {
        ExtractionMode::Monthly => {
            "This is a regular monthly timetable. List Eid or other marked days in special_dates."
        }
        ExtractionMode::Ramadan => {
            "This is a Ramadan timetable. Read suhoor/sehri end as fajr adhan when no separate \
             fajr column exists, and record each day's suhoor and iftar times as a special_dates \
             note. Mark the expected first of Ramadan, Laylatul Qadr nights and Eid."
        }
    };

    format!(
        "Extract the prayer timetable for {name}.\n{asr}\n{mode}\n\
         Times printed in 12-hour form must be converted: afternoon and evening prayers are PM.\n\
         If jumuah has a single time for the month, repeat it on each Friday.\n\n{SCHEMA_HINT}",
        name = request.mosque_name,
    )
}
