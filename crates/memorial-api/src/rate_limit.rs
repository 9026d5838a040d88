use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// One allowed submission per client per window.
pub const SUBMISSION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Fixed-window-per-key gate over submission frequency. State lives in
/// process memory only; it resets on restart, which is accepted.
///
/// Owned by the app state and passed in explicitly so tests can construct
/// isolated instances with short windows.
pub struct RateLimiter {
    window: Duration,
    last_allowed: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_allowed: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true and records the request time if this key has no allowed
    /// request inside the window. Denial is a normal outcome, not an error.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut map = self
            .last_allowed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match map.get(key) {
            Some(&last) if now.duration_since(last) <= self.window => false,
            _ => {
                map.insert(key.to_string(), now);
                true
            }
        }
    }
}

/// Rate-limit bucket for a request: first `x-forwarded-for` entry, else
/// `x-real-ip`, else the shared `"unknown"` bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real.is_empty() {
            return real.to_string();
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_request_per_window() {
        let limiter = RateLimiter::new(Duration::from_millis(40));

        assert!(limiter.allow("1.2.3.4"));
        assert!(!limiter.allow("1.2.3.4"));

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.allow("1.2.3.4"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(300));

        assert!(limiter.allow("1.2.3.4"));
        assert!(limiter.allow("5.6.7.8"));
        assert!(!limiter.allow("1.2.3.4"));
    }

    #[test]
    fn client_key_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "9.9.9.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "1.1.1.1".parse().unwrap());
        assert_eq!(client_key(&headers), "9.9.9.9");
    }

    #[test]
    fn client_key_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "1.1.1.1".parse().unwrap());
        assert_eq!(client_key(&headers), "1.1.1.1");

        assert_eq!(client_key(&HeaderMap::new()), "unknown");
    }
}
