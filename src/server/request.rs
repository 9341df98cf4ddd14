use std::collections::HashMap;
use std::io::Read;

use may_minihttp::Request;
use tracing::debug;

/// Parsed HTTP request data used by `AppService`.
///
/// The raw query string and body stay undecoded here; parameter decoding
/// belongs to the gateway core and only runs once a scope accepts the
/// request.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path with the query string removed.
    pub path: String,
    /// Raw query string, when the request line carried one.
    pub query: Option<String>,
    /// HTTP headers (lowercase keys).
    pub headers: HashMap<String, String>,
    /// Raw body bytes, when a body was present.
    pub body: Option<Vec<u8>>,
    /// Body used chunked transfer encoding (no declared length).
    pub chunked: bool,
}

/// Extract method, path, query string, headers, and body from a
/// `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let (path, query) = match raw_path.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (raw_path, None),
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let chunked = headers
        .get("transfer-encoding")
        .map(|v| v.to_ascii_lowercase().contains("chunked"))
        .unwrap_or(false);

    let body = {
        let mut buf = Vec::new();
        match req.body().read_to_end(&mut buf) {
            Ok(size) if size > 0 => {
                debug!(body_size_bytes = size, "request body read");
                Some(buf)
            }
            _ => None,
        }
    };

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        has_query = query.is_some(),
        chunked,
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
        chunked,
    }
}
