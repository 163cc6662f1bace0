//! Child age rendering for memory records.

use chrono::{Datelike, NaiveDate};

/// Render the age on `on` for a child born on `birthday`, e.g. `2岁3个月`.
///
/// A month only counts once its day-of-month has been reached. Returns
/// `None` for dates before the birthday.
pub fn format_age(birthday: NaiveDate, on: NaiveDate) -> Option<String> {
    if on < birthday {
        return None;
    }

    let mut months = (on.year() - birthday.year()) * 12 + on.month() as i32 - birthday.month() as i32;
    if on.day() < birthday.day() {
        months -= 1;
    }
    let years = months / 12;
    let rem = months % 12;

    Some(match (years, rem) {
        (0, m) => format!("{}个月", m),
        (y, 0) => format!("{}岁", y),
        (y, m) => format!("{}岁{}个月", y, m),
    })
}

/// Age for a record dated `date` (`YYYY-MM-DD`); empty when unknown.
pub fn age_for_record(birthday: Option<NaiveDate>, date: &str) -> String {
    let Some(birthday) = birthday else {
        return String::new();
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|on| format_age(birthday, on))
        .unwrap_or_default()
}
