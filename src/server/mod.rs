pub mod lifecycle;
pub mod request;
pub mod response;
pub mod service;

pub use lifecycle::{
    ConcurrencyMode, ServerConfig, ServerHandle, ServerLifecycle, ShutdownSignal,
};
pub use request::{read_request, ClientInfo, ParsedRequest};
pub use response::{Response, ResponseWriter};
pub use service::{AppService, Handled};
