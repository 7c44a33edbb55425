use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::Middleware;
use crate::server::request::{ClientInfo, ParsedRequest};
use crate::server::response::Response;

/// Verdict source for the authorization gate.
///
/// The gate's value is its position in the pipeline, not its current
/// verdict; swap the policy to enforce a real one.
pub trait AuthPolicy: Send + Sync {
    fn authorize(&self, req: &ParsedRequest, client: &ClientInfo) -> bool;
}

/// Default policy: every request is authorized.
pub struct AllowAll;

impl AuthPolicy for AllowAll {
    fn authorize(&self, _req: &ParsedRequest, _client: &ClientInfo) -> bool {
        true
    }
}

/// Pre-routing authorization check.
///
/// Runs before the router; a denied request is answered with 403 and never
/// reaches a handler.
pub struct AuthGate {
    policy: Arc<dyn AuthPolicy>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl AuthGate {
    #[must_use]
    pub fn new(policy: Arc<dyn AuthPolicy>) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn allow_all() -> Self {
        Self::new(Arc::new(AllowAll))
    }
}

impl Middleware for AuthGate {
    fn before(&self, req: &ParsedRequest, client: &ClientInfo) -> Option<Response> {
        if self.policy.authorize(req, client) {
            debug!(method = %req.method, path = %req.path, "request authorized");
            None
        } else {
            warn!(
                method = %req.method,
                path = %req.path,
                client_ip = %client.client_ip,
                "unauthorized request"
            );
            Some(Response::json(
                403,
                &json!({
                    "error": "403 Forbidden",
                    "message": "You are not authorized to access this page."
                }),
            ))
        }
    }
}
