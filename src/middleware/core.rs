use std::time::Duration;

use crate::server::request::{ClientInfo, ParsedRequest};
use crate::server::response::Response;

/// A pipeline stage that runs around request handling.
///
/// Stages execute in registration order. A `before` hook may short-circuit
/// the pipeline by returning a response, in which case no later `before`
/// hook response is taken and the router is never consulted. `after` hooks
/// always run, in the same order, whether the response came from a handler
/// or a short-circuit.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &ParsedRequest, _client: &ClientInfo) -> Option<Response> {
        None
    }

    fn after(
        &self,
        _req: &ParsedRequest,
        _client: &ClientInfo,
        _res: &mut Response,
        _latency: Duration,
    ) {
    }
}
