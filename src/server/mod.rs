pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use response::{ERROR_HEADER, PROTOCOL_HEADER, PROTOCOL_VERSION};
pub use service::{health_endpoint, metrics_endpoint, AppService, RouteScope};
