use may_minihttp::Response;
use serde_json::Value;

/// Wire-format version advertised on every handled response.
pub const PROTOCOL_VERSION: &str = "0.9";
/// Header carrying the wire-format version.
pub const PROTOCOL_HEADER: &str = "X-SQLite-Protocol";
/// Header carrying the error message on failures; the body has no error
/// channel of its own.
pub const ERROR_HEADER: &str = "X-SQLite-Error";

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        411 => "Length Required",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// A handled request whose body has been streamed.
pub fn write_gateway_ok(res: &mut Response, body: Vec<u8>) {
    res.status_code(200, "OK");
    res.header("Content-Type: text/plain");
    res.header("X-SQLite-Protocol: 0.9");
    res.body_vec(body);
}

/// A handled request that failed. `body` may hold a truncated row stream
/// when execution died mid-flight; it is sent as-is.
pub fn write_gateway_error(res: &mut Response, status: u16, message: Option<&str>, body: Vec<u8>) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: text/plain");
    res.header("X-SQLite-Protocol: 0.9");
    if let Some(message) = message {
        // may_minihttp takes whole 'static header lines; error text is
        // per-request, so the line is leaked (one short allocation per
        // failed request). Engine messages must not smuggle CR/LF into
        // the header block.
        let line = format!("{ERROR_HEADER}: {}", sanitize_header_value(message)).into_boxed_str();
        res.header(Box::leak(line));
    }
    res.body_vec(body);
}

/// JSON error shape used by the host fallback when every scope declines.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}

fn sanitize_header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
