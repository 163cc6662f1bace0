//! Input checks shared by the route handlers.

use chrono::{NaiveDate, NaiveTime};

pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY.M.D` or `YYYY/M/D`; returns `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Result<String, String> {
    let unified = value.trim().replace(['.', '/'], "-");
    NaiveDate::parse_from_str(&unified, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date: {}", value))
}

/// `HH:MM`, 24-hour clock.
pub fn normalize_time(value: &str) -> Result<String, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| format!("Invalid time: {}", value))
}

pub fn check_weekday(weekday: u8) -> Result<(), String> {
    if !(1..=7).contains(&weekday) {
        return Err(format!("Invalid weekday: {} (expected 1-7)", weekday));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2022.3.30").unwrap(), "2022-03-30");
        assert_eq!(normalize_date("2022/03/05").unwrap(), "2022-03-05");
        assert_eq!(normalize_date(" 2022-03-30 ").unwrap(), "2022-03-30");
        assert!(normalize_date("2022-13-01").is_err());
        assert!(normalize_date("yesterday").is_err());
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("8:05").unwrap(), "08:05");
        assert!(normalize_time("25:00").is_err());
    }

    #[test]
    fn test_require_text_and_weekday() {
        assert!(require_text("title", "  ").is_err());
        assert!(require_text("title", "x").is_ok());
        assert!(check_weekday(0).is_err());
        assert!(check_weekday(7).is_ok());
    }
}
