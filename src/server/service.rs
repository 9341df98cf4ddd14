use std::io;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use tracing::debug;

use super::request::parse_request;
use super::response::{write_gateway_error, write_gateway_ok, write_json_error};
use crate::config::GatewayConfig;
use crate::handler::{self, GatewayRequest, Outcome};
use crate::middleware::{MetricsMiddleware, Middleware};

/// One entry in the host's dispatch chain: a path prefix bound to an
/// immutable gateway configuration.
#[derive(Clone)]
pub struct RouteScope {
    pub prefix: String,
    pub config: Arc<GatewayConfig>,
}

impl RouteScope {
    pub fn new(prefix: impl Into<String>, config: GatewayConfig) -> Self {
        Self {
            prefix: prefix.into(),
            config: Arc::new(config),
        }
    }

    /// Prefix match on path-segment boundaries: `/sqlite` claims
    /// `/sqlite` and `/sqlite/zoo` but not `/sqlitex`.
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

/// The host service: infrastructure endpoints plus the ordered scope chain.
#[derive(Clone)]
pub struct AppService {
    pub scopes: Vec<RouteScope>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
}

impl AppService {
    pub fn new(scopes: Vec<RouteScope>) -> Self {
        Self {
            scopes,
            middlewares: Vec::new(),
            metrics: None,
        }
    }

    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    pub fn set_metrics_middleware(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    res.status_code(200, "OK");
    res.header("Content-Type: application/json");
    res.body_vec(json!({ "status": "ok" }).to_string().into_bytes());
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    let body = format!(
        "# HELP sqlgate_requests_total Total number of requests offered to the scope chain\n\
         # TYPE sqlgate_requests_total counter\n\
         sqlgate_requests_total {}\n\
         # HELP sqlgate_requests_handled_total Requests handled successfully by a scope\n\
         # TYPE sqlgate_requests_handled_total counter\n\
         sqlgate_requests_handled_total {}\n\
         # HELP sqlgate_requests_failed_total Requests claimed by a scope but failed\n\
         # TYPE sqlgate_requests_failed_total counter\n\
         sqlgate_requests_failed_total {}\n\
         # HELP sqlgate_requests_declined_total Requests every scope declined\n\
         # TYPE sqlgate_requests_declined_total counter\n\
         sqlgate_requests_declined_total {}\n\
         # HELP sqlgate_request_latency_seconds Average request latency in seconds\n\
         # TYPE sqlgate_request_latency_seconds gauge\n\
         sqlgate_request_latency_seconds {}\n",
        metrics.request_count(),
        metrics.handled_count(),
        metrics.failure_count(),
        metrics.declined_count(),
        metrics.average_latency().as_secs_f64(),
    );
    res.status_code(200, "OK");
    res.header("Content-Type: text/plain; version=0.0.4");
    res.body_vec(body.into_bytes());
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let start = Instant::now();
        let parsed = parse_request(req);

        if parsed.method == "GET" && parsed.path == "/health" {
            if let Some(metrics) = &self.metrics {
                metrics.inc_top_level_request();
            }
            return health_endpoint(res);
        }
        if parsed.method == "GET" && parsed.path == "/metrics" {
            if let Some(metrics) = &self.metrics {
                metrics.inc_top_level_request();
                return metrics_endpoint(res, metrics);
            }
            write_json_error(
                res,
                404,
                json!({"error": "Not Found", "method": parsed.method, "path": parsed.path}),
            );
            return Ok(());
        }

        let method = match parsed.method.parse::<Method>() {
            Ok(method) => method,
            Err(_) => {
                write_json_error(
                    res,
                    404,
                    json!({"error": "Not Found", "method": parsed.method, "path": parsed.path}),
                );
                return Ok(());
            }
        };

        let gw_req = GatewayRequest {
            method,
            path: parsed.path,
            query: parsed.query,
            body: parsed.body,
            chunked: parsed.chunked,
        };

        let mut early: Option<Outcome> = None;
        for mw in &self.middlewares {
            if early.is_none() {
                early = mw.before(&gw_req);
            } else {
                mw.before(&gw_req);
            }
        }

        let (outcome, body) = match early {
            Some(outcome) => (outcome, Vec::new()),
            None => {
                let mut body = Vec::new();
                let mut outcome = Outcome::Declined;
                for scope in &self.scopes {
                    if !scope.matches(&gw_req.path) {
                        continue;
                    }
                    body.clear();
                    match handler::handle(&scope.config, &gw_req, &mut body) {
                        Outcome::Declined => {
                            debug!(prefix = %scope.prefix, path = %gw_req.path, "scope declined");
                        }
                        other => {
                            outcome = other;
                            break;
                        }
                    }
                }
                (outcome, body)
            }
        };

        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(&gw_req, &outcome, latency);
        }

        match outcome {
            Outcome::Ok => write_gateway_ok(res, body),
            Outcome::Error { status, message } => {
                write_gateway_error(res, status, message.as_deref(), body)
            }
            Outcome::Declined => write_json_error(
                res,
                404,
                json!({
                    "error": "Not Found",
                    "method": gw_req.method.as_str(),
                    "path": gw_req.path
                }),
            ),
        }
        Ok(())
    }
}
