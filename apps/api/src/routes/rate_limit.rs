//! Per-client sliding-window request throttling.
//!
//! State lives in process memory only: it is lost on restart and not shared
//! between instances.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub struct RateLimiter {
    limit: usize,
    window: Duration,
    history: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request from `client` and reports whether it is allowed.
    /// Rejected requests are not recorded.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut history = self.history.lock();

        // drop expired hits for every client so idle entries do not pile up
        history.retain(|_, hits| {
            hits.retain(|t| now.saturating_duration_since(*t) < self.window);
            !hits.is_empty()
        });

        let hits = history.entry(client).or_default();
        if hits.len() >= self.limit {
            return false;
        }
        hits.push(now);
        true
    }

    /// Number of clients with requests inside the current window.
    #[cfg(test)]
    pub fn tracked_clients(&self) -> usize {
        self.history.lock().len()
    }
}

/// Middleware rejecting clients over the limit with 429.
///
/// Requests without connection info (in-process callers) share one bucket.
pub async fn throttle(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.rate_limiter.check(client) {
        warn!("Rate limit exceeded for {client}");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_limit_is_per_client() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(1), now));
        assert!(!limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(2), now));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at(ip(1), start));
        assert!(!limiter.check_at(ip(1), start + Duration::from_secs(59)));
        assert!(limiter.check_at(ip(1), start + Duration::from_secs(60)));
    }

    #[test]
    fn test_expired_clients_pruned_on_access() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();

        limiter.check_at(ip(1), start);
        limiter.check_at(ip(2), start);
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.check_at(ip(3), start + Duration::from_secs(11));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
