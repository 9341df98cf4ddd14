//! The gateway request handler.
//!
//! Sequences the request pipeline — decode parameters, resolve the
//! database path, resolve the query text, execute, serialize — with an
//! early exit at the first failing stage:
//!
//! ```text
//! Start → EnableCheck → (Declined | HeadShortCircuit | MethodCheck)
//!       → ParamsDecoded → PathResolved → QueryResolved
//!       → ConnectionOpened → VersionVerified → Executing(rows) → Done
//! ```
//!
//! The handler never touches the wire itself: rows stream into the writer
//! it was given, and everything else is reported through [`Outcome`] so
//! the host can map declines, successes, and failures to its own dispatch
//! chain.

use std::io::Write;

use http::Method;
use tracing::{debug, error};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::exec::Database;
use crate::params::{parse_params, ParamList, SQL_STATEMENT_PARAM};
use crate::resolve;
use crate::serialize::RowWriter;

/// The request as the gateway core sees it, already lifted out of the
/// host's HTTP types.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    /// Request path (without the query string); informational only.
    pub path: String,
    /// Raw query string, when the request line carried one.
    pub query: Option<String>,
    /// Raw body bytes, when the request carried a body.
    pub body: Option<Vec<u8>>,
    /// Body arrived with chunked transfer encoding (no known length).
    pub chunked: bool,
}

/// What became of a request offered to the handler.
///
/// `Declined` is not an error: it means "not my request" — no response
/// content was produced and the surrounding dispatch chain should keep
/// going. `Ok` means the body has already been streamed into the writer.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Disabled scope or unsupported method; the host tries its next
    /// handler.
    Declined,
    /// Handled; the body (possibly empty, for HEAD) is in the writer.
    Ok,
    /// Handled but failed. `message` goes in the error header when present.
    Error {
        status: u16,
        message: Option<String>,
    },
}

impl From<GatewayError> for Outcome {
    fn from(err: GatewayError) -> Self {
        Outcome::Error {
            status: err.status(),
            message: err.header_message(),
        }
    }
}

/// Offer one request to the gateway under the given scope configuration.
///
/// Rows are written to `out` as the engine produces them, so on an
/// execution failure `out` may already hold a truncated stream; the
/// returned `Error` status still stands. That a client can see rows and
/// then an error status is inherent to streaming output before the run
/// completes.
pub fn handle<W: Write>(config: &GatewayConfig, req: &GatewayRequest, out: &mut W) -> Outcome {
    if !config.enabled {
        return Outcome::Declined;
    }

    // HEAD completes right after the configuration check: 200, no body.
    if req.method == Method::HEAD {
        return Outcome::Ok;
    }

    // Exactly one input source: GET reads the query string, POST the body.
    let params = if req.method == Method::GET {
        parse_params(req.query.as_deref().unwrap_or("").as_bytes())
    } else if req.method == Method::POST {
        if req.chunked {
            return GatewayError::LengthRequired.into();
        }
        parse_params(req.body.as_deref().unwrap_or(&[]))
    } else {
        return Outcome::Declined;
    };
    debug!(path = %req.path, params = params.len(), "request parameters decoded");

    match execute(config, &params, out) {
        Ok(rows) => {
            debug!(path = %req.path, rows, "query complete");
            Outcome::Ok
        }
        Err(err) => {
            error!(path = %req.path, status = err.status(), error = %err, "request failed");
            err.into()
        }
    }
}

fn execute<W: Write>(
    config: &GatewayConfig,
    params: &ParamList,
    out: &mut W,
) -> Result<usize, GatewayError> {
    let db_path = resolve::database_path(config, params)?;
    let sql = query_text(config, params)?;
    debug!(query = %sql, "executing query");

    // The connection lives exactly as long as this scope; drop closes it
    // on success and on every error path alike.
    let db = Database::open(&db_path)?;
    let mut writer = RowWriter::new(out);
    db.run(&sql, &mut writer)?;
    Ok(writer.rows_written())
}

/// Fixed configuration query wins over the request's `q` parameter.
fn query_text(config: &GatewayConfig, params: &ParamList) -> Result<String, GatewayError> {
    if let Some(fixed) = &config.query {
        return Ok(fixed.clone());
    }
    params
        .get(SQL_STATEMENT_PARAM)
        .map(str::to_string)
        .ok_or(GatewayError::MissingQuery)
}
