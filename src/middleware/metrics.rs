use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::handler::{GatewayRequest, Outcome};

/// Passive request statistics, exposed through the `/metrics` endpoint.
///
/// All counters use relaxed atomic operations; the middleware observes and
/// records, it never blocks or answers requests.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    handled_count: AtomicUsize,
    failure_count: AtomicUsize,
    declined_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    top_level_requests: AtomicUsize,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            handled_count: AtomicUsize::new(0),
            failure_count: AtomicUsize::new(0),
            declined_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            top_level_requests: AtomicUsize::new(0),
        }
    }
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests offered to the scope chain.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests a scope handled successfully (body streamed).
    pub fn handled_count(&self) -> usize {
        self.handled_count.load(Ordering::Relaxed)
    }

    /// Requests a scope claimed but failed.
    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Requests every scope declined (answered by the host fallback).
    pub fn declined_count(&self) -> usize {
        self.declined_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all requests seen so far.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Count a hit on an infrastructure endpoint (`/health`, `/metrics`)
    /// that bypasses the scope chain.
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &GatewayRequest) -> Option<Outcome> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &GatewayRequest, outcome: &Outcome, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        match outcome {
            Outcome::Ok => {
                self.handled_count.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Error { .. } => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Declined => {
                self.declined_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
