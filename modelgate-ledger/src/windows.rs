//! Calendar window boundaries for spend aggregates, per SPEC_FULL.md §4.H — day and month
//! boundaries are UTC calendar boundaries, not rolling 24h/30d windows, matching the
//! rate limiter's calendar-bucketed convention in `modelgate_ratelimit::buckets`.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// `[start of at's UTC day, start of the next day)`.
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
    (start, start + Duration::days(1))
}

/// `[start of at's UTC calendar month, start of the next month)`.
pub fn month_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0).unwrap();
    let next = if at.month() == 12 {
        Utc.with_ymd_and_hms(at.year() + 1, 1, 1, 0, 0, 0).unwrap()
    } else {
        Utc.with_ymd_and_hms(at.year(), at.month() + 1, 1, 0, 0, 0).unwrap()
    };
    (start, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_cover_full_calendar_day() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 23, 59, 59).unwrap();
        let (start, end) = day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_handle_year_rollover() {
        let at = Utc.with_ymd_and_hms(2026, 12, 10, 5, 0, 0).unwrap();
        let (start, end) = month_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }
}
