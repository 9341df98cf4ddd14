//! # sqlgate
//!
//! **sqlgate** is a coroutine-powered SQL-over-HTTP gateway for SQLite,
//! built on the `may` runtime and `may_minihttp`.
//!
//! A request names a database file and a SQL statement (`db` and `q`
//! parameters, via GET query string or POST body); the gateway resolves
//! the file under the scope's configured base directory, executes the
//! statement against it, and streams the result set back as
//! semicolon-delimited, percent-escaped text lines — one header line of
//! column names, then one line per row.
//!
//! ## Architecture
//!
//! The library is organized into a small gateway core plus host plumbing:
//!
//! - **[`params`]** - URL-encoded parameter decoding into an ordered multimap
//! - **[`resolve`]** - database path resolution with traversal stripping
//! - **[`exec`]** - per-request SQLite connection, health check, multi-statement execution
//! - **[`serialize`]** - escaped, incrementally written result lines
//! - **[`handler`]** - the orchestrator; returns a tagged [`handler::Outcome`]
//! - **[`config`]** - per-scope configuration (YAML or CLI)
//! - **[`server`]** - HTTP front end: request parsing, scope dispatch chain,
//!   wire headers, `/health` and `/metrics`
//! - **[`middleware`]** - pluggable before/after hooks (metrics, tracing)
//!
//! Control flow is strictly linear per request: decode → resolve →
//! execute → serialize, with the handler short-circuiting to a failure
//! outcome at the first stage that reports one. A disabled scope or an
//! unsupported method produces a *decline*, not an error: the host keeps
//! walking its dispatch chain and falls back to a JSON 404 when nobody
//! claims the request.
//!
//! ## Wire format
//!
//! Handled responses carry `X-SQLite-Protocol: 0.9`. Failures carry the
//! human-readable engine or gateway message in `X-SQLite-Error`; the body
//! has no error channel. Every column name and field value is
//! percent-escaped and ampersand-hardened so the `;` delimiter and line
//! structure stay unambiguous.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqlgate::config::GatewayConfig;
//! use sqlgate::middleware::MetricsMiddleware;
//! use sqlgate::server::{AppService, HttpServer, RouteScope};
//!
//! let scope = RouteScope::new("/sqlite", GatewayConfig {
//!     enabled: true,
//!     base_dir: Some("/var/lib/sqlgate".to_string()),
//!     db_file: None,
//!     query: None,
//! });
//! let mut service = AppService::new(vec![scope]);
//! let metrics = Arc::new(MetricsMiddleware::new());
//! service.add_middleware(metrics.clone());
//! service.set_metrics_middleware(metrics);
//!
//! let handle = HttpServer(service).start("0.0.0.0:8080").unwrap();
//! // handle.join() to block
//! ```
//!
//! ## Runtime considerations
//!
//! sqlgate uses the `may` coroutine runtime, not tokio or async-std. All
//! request handling is synchronous blocking code on a serving coroutine;
//! stack size is configurable via the `SQLGATE_STACK_SIZE` environment
//! variable. Each request opens its own SQLite connection and closes it
//! before returning — there is no pooling and no state shared across
//! requests beyond the read-only scope configuration.

pub mod config;
pub mod error;
pub mod exec;
pub mod handler;
pub mod middleware;
pub mod params;
pub mod resolve;
pub mod runtime_config;
pub mod serialize;
pub mod server;

pub use config::{load_config, GatewayConfig, ScopeConfig, ServerConfig};
pub use error::GatewayError;
pub use handler::{GatewayRequest, Outcome};
