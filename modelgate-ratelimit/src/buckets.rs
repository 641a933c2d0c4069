//! Calendar-bucketed window keys, per SPEC_FULL.md §4.E: bucket key = strftime-formatted window
//! start, not a rolling window.

use chrono::{DateTime, Utc};
use modelgate_core::{RateWindow, TenantId};

pub fn window_str(window: RateWindow) -> &'static str {
    match window {
        RateWindow::Minute => "minute",
        RateWindow::Hour => "hour",
        RateWindow::Day => "day",
    }
}

fn bucket_suffix(window: RateWindow, now: DateTime<Utc>) -> String {
    match window {
        RateWindow::Minute => now.format("%Y%m%d%H%M").to_string(),
        RateWindow::Hour => now.format("%Y%m%d%H").to_string(),
        RateWindow::Day => now.format("%Y%m%d").to_string(),
    }
}

/// `rate:{tenant}:{window}:{bucket}`.
pub fn bucket_key(tenant_id: TenantId, window: RateWindow, now: DateTime<Utc>) -> String {
    format!("rate:{tenant_id}:{}:{}", window_str(window), bucket_suffix(window, now))
}

pub fn reset_prefix(tenant_id: TenantId) -> String {
    format!("rate:{tenant_id}:")
}

/// Seconds remaining until the current bucket for `window` rolls over, rounded up, never 0.
pub fn seconds_until_window_end(window: RateWindow, now: DateTime<Utc>) -> u64 {
    let elapsed_in_window = match window {
        RateWindow::Minute => now.timestamp() % 60,
        RateWindow::Hour => now.timestamp() % 3_600,
        RateWindow::Day => now.timestamp() % 86_400,
    };
    let remaining = window.duration_seconds() - elapsed_in_window;
    remaining.max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bucket_key_uses_calendar_boundaries() {
        let tenant_id = TenantId::new();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 5).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 59).unwrap();
        assert_eq!(
            bucket_key(tenant_id, RateWindow::Minute, t1),
            bucket_key(tenant_id, RateWindow::Minute, t2)
        );

        let t3 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 31, 0).unwrap();
        assert_ne!(
            bucket_key(tenant_id, RateWindow::Minute, t1),
            bucket_key(tenant_id, RateWindow::Minute, t3)
        );
    }

    #[test]
    fn seconds_until_window_end_is_never_zero_at_boundary() {
        let tenant_id = TenantId::new();
        let _ = tenant_id;
        let at_boundary = Utc.with_ymd_and_hms(2026, 1, 15, 10, 31, 0).unwrap();
        assert_eq!(seconds_until_window_end(RateWindow::Minute, at_boundary), 60);
        let one_before = Utc.with_ymd_and_hms(2026, 1, 15, 10, 31, 59).unwrap();
        assert_eq!(seconds_until_window_end(RateWindow::Minute, one_before), 1);
    }
}
