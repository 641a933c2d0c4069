//! `X-RateLimit-*` / `Retry-After` header stamping for `/v1/*` responses, per SPEC_FULL.md §6.

use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::Utc;
use modelgate_core::{RateWindow, RateWindowUsage};

/// Same calendar-bucket arithmetic as `modelgate_ratelimit::buckets::seconds_until_window_end`,
/// duplicated here rather than exposed publicly since it's the only thing this crate needs from
/// that module.
fn seconds_until_window_end(window: RateWindow) -> u64 {
    let now = Utc::now().timestamp();
    let elapsed = match window {
        RateWindow::Minute => now % 60,
        RateWindow::Hour => now % 3_600,
        RateWindow::Day => now % 86_400,
    };
    (window.duration_seconds() - elapsed).max(1) as u64
}

/// Picks the most constrained window (lowest remaining fraction) to represent in the standard
/// `X-RateLimit-*` triad — the minute window whenever present, since it is always the tightest
/// bound in practice, falling back to whatever window is available.
fn representative(usage: &[RateWindowUsage]) -> Option<&RateWindowUsage> {
    usage
        .iter()
        .find(|u| u.window == RateWindow::Minute)
        .or_else(|| usage.iter().min_by_key(|u| u.remaining))
}

pub fn rate_limit_headers(usage: &[RateWindowUsage]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(rep) = representative(usage) else {
        return headers;
    };
    if let Ok(v) = HeaderValue::from_str(&rep.limit.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&rep.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&seconds_until_window_end(rep.window).to_string()) {
        headers.insert("x-ratelimit-reset", v);
    }
    headers
}

/// Stamps `X-RateLimit-*` onto an otherwise-complete success response.
pub fn stamp(mut response: Response, usage: &[RateWindowUsage]) -> Response {
    response.headers_mut().extend(rate_limit_headers(usage));
    response
}

pub fn retry_after_header(retry_after_secs: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&retry_after_secs.to_string()) {
        headers.insert("retry-after", v);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representative_prefers_minute_window() {
        let usage = vec![
            RateWindowUsage { window: RateWindow::Day, used: 1, limit: 100, remaining: 99 },
            RateWindowUsage { window: RateWindow::Minute, used: 5, limit: 10, remaining: 5 },
        ];
        assert_eq!(representative(&usage).unwrap().window, RateWindow::Minute);
    }

    #[test]
    fn empty_usage_yields_no_headers() {
        assert!(rate_limit_headers(&[]).is_empty());
    }
}
