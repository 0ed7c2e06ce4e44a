use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::state::AppState;

/// Sliding-window request counter keyed by client address
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: Mutex<Clients>,
}

#[derive(Default)]
struct Clients {
    requests: HashMap<IpAddr, VecDeque<Instant>>,
    last_cleanup: Option<Instant>,
}

impl Clients {
    /// Drop clients with no request inside the window
    fn cleanup(&mut self, now: Instant, window: Duration) {
        self.requests.retain(|_, requests| {
            requests
                .back()
                .is_some_and(|&newest| now.duration_since(newest) < window)
        });
        self.last_cleanup = Some(now);
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(Clients::default()),
        }
    }

    /// Record a request at `now`; false when the client is over its budget
    ///
    /// Idle clients are swept out at most once per window.
    pub fn check(&self, client: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock();

        let sweep_due = clients
            .last_cleanup
            .map_or(true, |last| now.duration_since(last) >= self.window);
        if sweep_due {
            clients.cleanup(now, self.window);
        }

        let requests = clients.requests.entry(client).or_default();

        while let Some(&oldest) = requests.front() {
            if now.duration_since(oldest) >= self.window {
                requests.pop_front();
            } else {
                break;
            }
        }

        if requests.len() >= self.max_requests {
            return false;
        }

        requests.push_back(now);
        true
    }

    /// Drop clients that have been idle for a whole window
    pub fn cleanup(&self, now: Instant) {
        let mut clients = self.clients.lock();
        let before = clients.requests.len();
        clients.cleanup(now, self.window);

        let evicted = before - clients.requests.len();
        if evicted > 0 {
            debug!("Evicted {} idle clients from the rate limiter", evicted);
        }
    }

    /// Number of clients currently being tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().requests.len()
    }
}

/// Middleware rejecting clients that exceed the configured request rate
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.rate_limiter.check(client, Instant::now()) {
        warn!("Rate limit exceeded for {}", client);
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}
