use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crate::error::AppError;
use dashmap::DashMap;
use std::{
    hash::Hash,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rate limiter keyed by client IP address
pub type IpRateLimiter = Arc<FixedWindowRateLimiter<IpAddr>>;

#[derive(Debug, Clone, Copy)]
struct Window {
    index: u64,
    count: u32,
}

/// Outcome of counting one request against the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time left until the current window closes.
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Seconds until the next window, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0)
    }
}

/// Fixed-window request counter.
///
/// Time is split into consecutive windows of equal length starting at the
/// instant the limiter was created, so every client shares the same window
/// boundaries. Each key keeps a single `(window index, count)` pair that is
/// reset the first time the key is seen in a newer window.
pub struct FixedWindowRateLimiter<K> {
    windows: DashMap<K, Window>,
    limit: u32,
    window: Duration,
    started_at: Instant,
}

impl<K> FixedWindowRateLimiter<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::starting_at(limit, window, Instant::now())
    }

    pub fn starting_at(limit: u32, window: Duration, started_at: Instant) -> Self {
        Self {
            windows: DashMap::new(),
            limit: limit.max(1),
            window: window.max(Duration::from_millis(1)),
            started_at,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check_key(&self, key: &K) -> RateLimitDecision {
        self.check_key_at(key, Instant::now())
    }

    /// Counts a request for `key` at `now`.
    pub fn check_key_at(&self, key: &K, now: Instant) -> RateLimitDecision {
        let (index, reset_after) = self.position(now);

        let count = {
            let mut entry = self
                .windows
                .entry(key.clone())
                .or_insert(Window { index, count: 0 });
            if entry.index != index {
                entry.index = index;
                entry.count = 0;
            }
            entry.count = entry.count.saturating_add(1);
            entry.count
        };

        RateLimitDecision {
            allowed: count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(count),
            reset_after,
        }
    }

    /// Drops counters belonging to windows that have already closed.
    pub fn purge_stale(&self) {
        self.purge_stale_at(Instant::now());
    }

    pub fn purge_stale_at(&self, now: Instant) {
        let (index, _) = self.position(now);
        self.windows.retain(|_, window| window.index >= index);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn position(&self, now: Instant) -> (u64, Duration) {
        let elapsed = now.saturating_duration_since(self.started_at).as_nanos();
        let window = self.window.as_nanos();
        let index = (elapsed / window) as u64;
        let into_window = elapsed % window;
        let reset_after = Duration::from_nanos((window - into_window) as u64);
        (index, reset_after)
    }
}

/// Create a keyed rate limiter (by IP)
pub fn create_ip_rate_limiter(requests: u32, window_seconds: u64) -> IpRateLimiter {
    Arc::new(FixedWindowRateLimiter::new(
        requests,
        Duration::from_secs(window_seconds),
    ))
}

/// Where the rate-limit key is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientIpSource {
    /// The TCP peer address of the connection.
    #[default]
    PeerAddress,
    /// The first `x-forwarded-for` entry, falling back to the peer address.
    /// Only meaningful behind a proxy that overwrites the header.
    ForwardedFor,
}

/// State for `ip_rate_limit_middleware`.
#[derive(Clone)]
pub struct IpRateLimit {
    pub limiter: IpRateLimiter,
    pub source: ClientIpSource,
}

impl IpRateLimit {
    pub fn new(limiter: IpRateLimiter, source: ClientIpSource) -> Self {
        Self { limiter, source }
    }
}

/// Client address used as the rate-limit key.
pub fn client_ip(request: &Request, source: ClientIpSource) -> Option<IpAddr> {
    let forwarded_ip = match source {
        ClientIpSource::PeerAddress => None,
        ClientIpSource::ForwardedFor => request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok()),
    };

    forwarded_ip.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

fn insert_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(decision.remaining));
}

/// Middleware for IP-based rate limiting
pub async fn ip_rate_limit_middleware(
    State(rate_limit): State<IpRateLimit>,
    request: Request,
    next: Next,
) -> Response {
    let Some(ip) = client_ip(&request, rate_limit.source) else {
        tracing::warn!("Could not determine IP for rate limiting");
        return next.run(request).await;
    };

    let decision = rate_limit.limiter.check_key(&ip);
    if !decision.allowed {
        tracing::warn!(ip = %ip, limit = decision.limit, "Rate limit exceeded");
        let mut res = AppError::TooManyRequests(
            "Too many requests, please try again later.".to_string(),
            Some(decision.retry_after_secs()),
        )
        .into_response();
        insert_limit_headers(res.headers_mut(), &decision);
        return res;
    }

    let mut res = next.run(request).await;
    insert_limit_headers(res.headers_mut(), &decision);
    res
}
