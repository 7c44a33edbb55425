mod auth;
mod core;
mod request_log;

pub use auth::{AllowAll, AuthGate, AuthPolicy};
pub use core::Middleware;
pub use request_log::RequestLogMiddleware;
