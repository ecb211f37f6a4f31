use chrono::{Datelike, Timelike, Weekday};

/// Whether alerting should be suppressed at the given local time.
///
/// The active window is [06:00, 18:00) on Monday through Friday; weekends
/// are suppressed entirely. Pure function of the timestamp, so the monitor
/// passes `Local::now()` and tests pass fixed values.
pub fn is_suppressed<T: Datelike + Timelike>(now: &T) -> bool {
    matches!(now.weekday(), Weekday::Sat | Weekday::Sun) || now.hour() >= 18 || now.hour() < 6
}
