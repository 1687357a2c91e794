//! Listing date parsing and calendar attributes.

use chrono::{Datelike, NaiveDate};

/// Source date format, e.g. `31/12/2023`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a listing date. Missing or malformed values yield `None`.
pub fn parse_listing_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Full weekday name, e.g. `Monday`.
pub fn day_of_week(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Full month name, e.g. `January`.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// `Q1`..`Q4`.
pub fn quarter(date: NaiveDate) -> String {
    format!("Q{}", (date.month() - 1) / 3 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_first() {
        assert_eq!(parse_listing_date(Some("31/12/2023")), Some(ymd(2023, 12, 31)));
        assert_eq!(parse_listing_date(Some(" 05/01/2024 ")), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert_eq!(parse_listing_date(None), None);
        assert_eq!(parse_listing_date(Some("")), None);
        assert_eq!(parse_listing_date(Some("N/A")), None);
        assert_eq!(parse_listing_date(Some("2024-01-05")), None);
        assert_eq!(parse_listing_date(Some("31/02/2024")), None);
    }

    #[test]
    fn test_calendar_names() {
        let date = ymd(2024, 1, 1);
        assert_eq!(day_of_week(date), "Monday");
        assert_eq!(month_name(date), "January");
    }

    #[test]
    fn test_quarter_boundaries() {
        let cases = [(1, "Q1"), (3, "Q1"), (4, "Q2"), (6, "Q2"), (7, "Q3"), (9, "Q3"), (10, "Q4"), (12, "Q4")];
        for (month, expected) in cases {
            assert_eq!(quarter(ymd(2024, month, 1)), expected, "month {month}");
        }
    }
}
