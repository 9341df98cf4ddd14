use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::handler::{GatewayRequest, Outcome};

/// Logs one structured line per request with its final disposition.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &GatewayRequest, outcome: &Outcome, latency: Duration) {
        let disposition = match outcome {
            Outcome::Ok => "ok",
            Outcome::Error { .. } => "error",
            Outcome::Declined => "declined",
        };
        let status = match outcome {
            Outcome::Ok => 200,
            Outcome::Error { status, .. } => *status,
            Outcome::Declined => 0,
        };
        info!(
            method = %req.method,
            path = %req.path,
            disposition,
            status,
            latency_ms = latency.as_millis() as u64,
            "request complete"
        );
    }
}
