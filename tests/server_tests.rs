//! End-to-end tests for the HTTP front end: raw requests over TCP against
//! a server on a random port, asserting statuses, wire headers, and the
//! streamed text bodies.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use sqlgate::config::GatewayConfig;
use sqlgate::middleware::{MetricsMiddleware, TracingMiddleware};
use sqlgate::server::{AppService, HttpServer, RouteScope, ServerHandle};

mod common;
use common::{fixtures, test_server};

/// Test fixture with automatic teardown: the server stops when the test
/// completes, even on panic.
struct GatewayTestServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
    _dir: tempfile::TempDir,
}

impl GatewayTestServer {
    fn new() -> Self {
        test_server::setup_may_runtime();

        let dir = tempfile::tempdir().unwrap();
        fixtures::create_pets_db(dir.path(), "pets.db");
        let base_dir = dir.path().to_string_lossy().into_owned();

        let scopes = vec![
            RouteScope::new("/off", GatewayConfig::default()),
            RouteScope::new(
                "/sqlite",
                GatewayConfig {
                    enabled: true,
                    base_dir: Some(base_dir.clone()),
                    db_file: None,
                    query: None,
                },
            ),
            // fixed file and query: the request supplies nothing
            RouteScope::new(
                "/report",
                GatewayConfig {
                    enabled: true,
                    base_dir: Some(base_dir),
                    db_file: Some("pets.db".to_string()),
                    query: Some("SELECT name FROM pets ORDER BY id".to_string()),
                },
            ),
        ];

        let mut service = AppService::new(scopes);
        let metrics = Arc::new(MetricsMiddleware::new());
        service.add_middleware(metrics.clone());
        service.add_middleware(Arc::new(TracingMiddleware));
        service.set_metrics_middleware(metrics);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let handle = HttpServer(service).start(addr).unwrap();
        handle.wait_ready().unwrap();

        Self {
            handle: Some(handle),
            addr,
            _dir: dir,
        }
    }

    fn addr(&self) -> &SocketAddr {
        &self.addr
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {:?}", e),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn get(addr: &SocketAddr, target: &str) -> String {
    send_request(
        addr,
        &format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
    )
}

fn parse_response(resp: &str) -> (u16, HashMap<String, String>, String) {
    let mut parts = resp.splitn(2, "\r\n\r\n");
    let head = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("").to_string();

    let mut status = 0;
    let mut headers = HashMap::new();
    for (idx, line) in head.lines().enumerate() {
        if idx == 0 {
            status = line.split_whitespace().nth(1).unwrap_or("0").parse().unwrap_or(0);
        } else if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    (status, headers, body)
}

#[test]
fn test_get_select_streams_rows() {
    let server = GatewayTestServer::new();
    let resp = get(
        server.addr(),
        "/sqlite?db=pets.db&q=SELECT+id%2C+name+FROM+pets+ORDER+BY+id",
    );
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(headers.get("x-sqlite-protocol").map(String::as_str), Some("0.9"));
    assert_eq!(body, "id;name\n1;rex\n2;tom\n3;nib\n");
}

#[test]
fn test_missing_db_sets_error_header() {
    let server = GatewayTestServer::new();
    let resp = get(server.addr(), "/sqlite?q=SELECT+1");
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 500);
    assert_eq!(
        headers.get("x-sqlite-error").map(String::as_str),
        Some("No Database name specified")
    );
    assert!(body.is_empty());
}

#[test]
fn test_unknown_database_is_404_without_error_header() {
    let server = GatewayTestServer::new();
    let resp = get(server.addr(), "/sqlite?db=absent.db&q=SELECT+1");
    let (status, headers, _) = parse_response(&resp);
    assert_eq!(status, 404);
    assert!(!headers.contains_key("x-sqlite-error"));
    assert_eq!(headers.get("x-sqlite-protocol").map(String::as_str), Some("0.9"));
}

#[test]
fn test_post_form_body() {
    let server = GatewayTestServer::new();
    let body = "db=pets.db&q=SELECT+1";
    let req = format!(
        "POST /sqlite HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (status, headers, body) = parse_response(&send_request(server.addr(), &req));
    assert_eq!(status, 200);
    assert_eq!(headers.get("x-sqlite-protocol").map(String::as_str), Some("0.9"));
    assert_eq!(body, "1\n1\n");
}

#[test]
fn test_head_is_200_with_empty_body() {
    let server = GatewayTestServer::new();
    let req = "HEAD /sqlite HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
    let (status, _, body) = parse_response(&send_request(server.addr(), req));
    assert_eq!(status, 200);
    assert!(body.is_empty());
}

#[test]
fn test_fixed_scope_needs_no_parameters() {
    let server = GatewayTestServer::new();
    let (status, _, body) = parse_response(&get(server.addr(), "/report"));
    assert_eq!(status, 200);
    assert_eq!(body, "name\nrex\ntom\nnib\n");
}

#[test]
fn test_fixed_query_wins_over_request_query() {
    let server = GatewayTestServer::new();
    let (status, _, body) = parse_response(&get(server.addr(), "/report?q=SELECT+12345"));
    assert_eq!(status, 200);
    assert_eq!(body, "name\nrex\ntom\nnib\n");
}

#[test]
fn test_disabled_scope_falls_through_to_404() {
    let server = GatewayTestServer::new();
    let resp = get(server.addr(), "/off?db=pets.db&q=SELECT+1");
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 404);
    assert!(!headers.contains_key("x-sqlite-protocol"));
    assert!(body.contains("Not Found"));
}

#[test]
fn test_unmatched_path_is_404() {
    let server = GatewayTestServer::new();
    let (status, _, body) = parse_response(&get(server.addr(), "/nowhere"));
    assert_eq!(status, 404);
    assert!(body.contains("Not Found"));
}

#[test]
fn test_unsupported_method_declines() {
    let server = GatewayTestServer::new();
    let req = "DELETE /sqlite HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
    let (status, headers, _) = parse_response(&send_request(server.addr(), req));
    assert_eq!(status, 404);
    assert!(!headers.contains_key("x-sqlite-protocol"));
}

#[test]
fn test_ampersand_in_field_stays_escaped_on_the_wire() {
    let server = GatewayTestServer::new();
    let resp = get(
        server.addr(),
        "/sqlite?db=pets.db&q=SELECT+notes+FROM+pets+WHERE+id+%3D+2",
    );
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "notes\ncat%20%26%20mouse\n");
    assert!(!body.contains('&'));
}

#[test]
fn test_syntax_error_surfaces_engine_message() {
    let server = GatewayTestServer::new();
    let resp = get(server.addr(), "/sqlite?db=pets.db&q=SELEKT+nope");
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 500);
    let message = headers.get("x-sqlite-error").expect("error header missing");
    assert!(message.to_lowercase().contains("syntax"));
    assert!(body.is_empty());
}

#[test]
fn test_health_endpoint() {
    let server = GatewayTestServer::new();
    let (status, _, body) = parse_response(&get(server.addr(), "/health"));
    assert_eq!(status, 200);
    assert_eq!(body, "{\"status\":\"ok\"}");
}

#[test]
fn test_metrics_endpoint_counts_requests() {
    let server = GatewayTestServer::new();
    let _ = get(server.addr(), "/sqlite?db=pets.db&q=SELECT+1");
    let (status, _, body) = parse_response(&get(server.addr(), "/metrics"));
    assert_eq!(status, 200);
    assert!(body.contains("sqlgate_requests_total"));
    assert!(body.contains("sqlgate_requests_handled_total 1"));
}
