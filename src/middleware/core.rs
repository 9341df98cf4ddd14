use std::time::Duration;

use crate::handler::{GatewayRequest, Outcome};

pub trait Middleware: Send + Sync {
    /// Runs before the scope chain; returning an outcome answers the
    /// request without consulting any scope.
    fn before(&self, _req: &GatewayRequest) -> Option<Outcome> {
        None
    }

    /// Runs once with the request's final disposition. `Declined` here
    /// means no scope claimed the request and the host fallback answered.
    fn after(&self, _req: &GatewayRequest, _outcome: &Outcome, _latency: Duration) {}
}
