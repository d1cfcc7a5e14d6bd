//! Date and countdown formatting shared by the calendar and the timer.

use chrono::{Datelike, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `YYYY-MM-DD` key for a local calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

/// `MM:SS`; minutes are not wrapped at 60.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// e.g. "February 2024". `month0` is zero-based and normalized into the
/// following years when it exceeds 11; the year saturates at `i32::MAX`.
pub fn month_label(year: i32, month0: u32) -> String {
    let year = i32::try_from(month0 / 12)
        .ok()
        .and_then(|carry| year.checked_add(carry))
        .unwrap_or(i32::MAX);
    format!("{} {}", MONTH_NAMES[(month0 % 12) as usize], year)
}

pub fn short_weekday(date: NaiveDate) -> &'static str {
    match date.weekday().num_days_from_sunday() {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        _ => "Sat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_zero_pads() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_key(d), "2024-03-07");
        assert_eq!(parse_date_key("2024-03-07"), Some(d));
        assert_eq!(parse_date_key("2024-3-7x"), None);
    }

    #[test]
    fn countdown_format() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(25 * 60), "25:00");
        assert_eq!(format_countdown(61), "01:01");
        assert_eq!(format_countdown(125 * 60 + 9), "125:09");
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(2024, 1), "February 2024");
        assert_eq!(month_label(2024, 12), "January 2025");
        assert_eq!(month_label(i32::MAX, 12), format!("January {}", i32::MAX));
        assert_eq!(month_label(i32::MAX, u32::MAX), format!("April {}", i32::MAX));
    }

    #[test]
    fn weekday_names() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(short_weekday(d), "Sun");
    }
}
