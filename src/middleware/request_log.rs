use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::server::request::{ClientInfo, ParsedRequest};
use crate::server::response::Response;

/// Logs every request on the way in and the outcome on the way out.
pub struct RequestLogMiddleware;

impl Middleware for RequestLogMiddleware {
    fn before(&self, req: &ParsedRequest, client: &ClientInfo) -> Option<Response> {
        info!(
            method = %req.method,
            path = %req.path,
            client_ip = %client.client_ip,
            client_port = client.client_port,
            "request received"
        );
        None
    }

    fn after(
        &self,
        req: &ParsedRequest,
        _client: &ClientInfo,
        res: &mut Response,
        latency: Duration,
    ) {
        info!(
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "request handled"
        );
    }
}
