use crate::error::{GpaintError, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Number of days in the trailing calendar window, today included.
pub const WINDOW_DAYS: i64 = 365;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| GpaintError::InvalidDate(format!("'{input}' is not a YYYY-MM-DD date ({e})")))
}

pub fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WINDOW_DAYS - 1)
}

/// Monday on or before the window start; the first day shown on the calendar.
pub fn week_anchor(today: NaiveDate) -> NaiveDate {
    let mut day = window_start(today);
    while day.weekday() != Weekday::Mon {
        day = day - Duration::days(1);
    }
    day
}

/// Every day from the week anchor through `today`, oldest first.
pub fn calendar_days(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    week_anchor(today)
        .iter_days()
        .take_while(move |day| *day <= today)
}
