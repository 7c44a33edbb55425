//! # taskstream
//!
//! A small coroutine-powered HTTP server that keeps an in-memory task list
//! and streams every response body in fixed-size chunks.
//!
//! ## Architecture
//!
//! - **[`chunk`]** - fixed-size chunking of response bodies
//! - **[`store`]** - the process-wide task list
//! - **[`router`]** - `(method, exact path)` dispatch with echo fallback
//! - **[`middleware`]** - request interceptors (request log, authorization
//!   gate); a `before` hook may short-circuit with a response
//! - **[`server`]** - request parsing, response streaming, and the
//!   singleton server lifecycle on the `may` coroutine runtime
//!
//! Control flow: the lifecycle accepts a connection, the request is parsed,
//! the middleware chain runs (authorization before any handler), the router
//! picks a handler, the handler may touch the task store, and the response
//! is streamed chunk by chunk.
//!
//! ## Quick start
//!
//! ```no_run
//! use taskstream::server::{ServerConfig, ServerLifecycle};
//!
//! let server = ServerLifecycle::instance(ServerConfig::default());
//! let handle = server.start().expect("bind failed");
//! handle.join().expect("server failed");
//! ```
//!
//! Only one server instance exists per process; see
//! [`server::ServerLifecycle::instance`].

pub mod chunk;
pub mod cli;
pub mod error;
pub mod html;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod store;

pub use chunk::{ChunkStream, DEFAULT_CHUNK_SIZE};
pub use error::RequestError;
pub use router::{Route, Router};
pub use store::TaskStore;
