use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use may::coroutine::JoinHandle;
use may::net::{TcpListener, TcpStream};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use super::request::{read_request, ClientInfo};
use super::response::{Response, ResponseWriter};
use super::service::AppService;
use crate::chunk::DEFAULT_CHUNK_SIZE;
use crate::error::RequestError;
use crate::middleware::{AuthGate, RequestLogMiddleware};
use crate::store::TaskStore;

/// How connections are scheduled onto the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConcurrencyMode {
    /// One request fully handled before the next accept (default).
    Sequential,
    /// A coroutine per connection; store mutation stays mutex-guarded.
    PerConnection,
}

/// Server configuration, fixed at singleton construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub concurrency: ConcurrencyMode,
    /// Characters per body write.
    pub chunk_size: usize,
    /// Bound on how long a slow client may stall a body read.
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            concurrency: ConcurrencyMode::Sequential,
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Shutdown flag shared between the accept loop, the shutdown route, and
/// the signal handler.
///
/// Triggering sets the flag and pokes the listener with a throwaway
/// connection so a blocked `accept` observes it.
pub struct ShutdownSignal {
    triggered: AtomicBool,
    wake_addr: Mutex<Option<SocketAddr>>,
}

impl ShutdownSignal {
    fn new() -> Self {
        Self {
            triggered: AtomicBool::new(false),
            wake_addr: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("shutdown requested");
        let wake = *self.wake_addr.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(addr) = wake {
            // Unblock the accept loop; the connection itself is discarded.
            let _ = std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(200));
        }
    }

    fn set_wake_addr(&self, addr: SocketAddr) {
        *self.wake_addr.lock().unwrap_or_else(|e| e.into_inner()) = Some(addr);
    }

    /// Re-arm the signal so a stopped server can be started again.
    fn reset(&self) {
        self.triggered.store(false, Ordering::SeqCst);
    }
}

/// Handle to the running accept loop.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    lifecycle: Arc<ServerLifecycle>,
}

impl ServerHandle {
    /// Address the listener actually bound (resolves port 0).
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll until the server accepts connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not reachable within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if std::net::TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Block until the accept loop exits.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }

    /// Trigger shutdown and wait for the loop to wind down.
    pub fn stop(self) {
        self.lifecycle.shutdown();
        let _ = self.handle.join();
    }
}

static INSTANCE: OnceCell<Arc<ServerLifecycle>> = OnceCell::new();

/// Owns the listening socket and the accept/dispatch loop.
///
/// Exactly one instance exists per process: [`ServerLifecycle::instance`]
/// constructs it lazily on first call and hands the same instance back on
/// every later call, whatever arguments those calls carry. One server per
/// process is a design decision, not an accident.
pub struct ServerLifecycle {
    config: ServerConfig,
    service: Arc<AppService>,
    signal: Arc<ShutdownSignal>,
    local_addr: Mutex<Option<SocketAddr>>,
}

/// Clears the bound-address record when the accept loop exits, however it
/// exits. The listener itself is closed by drop in the same scope.
struct ListenerGuard<'a> {
    lifecycle: &'a ServerLifecycle,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        *self
            .lifecycle
            .local_addr
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        info!("listener closed");
    }
}

impl ServerLifecycle {
    /// Get the process-wide server instance, constructing it on first call.
    pub fn instance(config: ServerConfig) -> &'static Arc<ServerLifecycle> {
        let mut first = false;
        let instance = INSTANCE.get_or_init(|| {
            first = true;
            Arc::new(ServerLifecycle::build(config.clone()))
        });
        if !first && instance.config != config {
            warn!("server instance already constructed; new configuration ignored");
        }
        instance
    }

    fn build(config: ServerConfig) -> Self {
        let store = Arc::new(TaskStore::new());
        let mut service = AppService::new(store);
        service.add_middleware(Arc::new(RequestLogMiddleware));
        service.add_middleware(Arc::new(AuthGate::allow_all()));
        Self {
            config,
            service: Arc::new(service),
            signal: Arc::new(ShutdownSignal::new()),
            local_addr: Mutex::new(None),
        }
    }

    /// The task store behind this server.
    #[must_use]
    pub fn store(&self) -> Arc<TaskStore> {
        Arc::clone(&self.service.store)
    }

    /// Address the listener is bound to, while serving.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Request a graceful shutdown: stop accepting, close the socket.
    pub fn shutdown(&self) {
        self.signal.trigger();
    }

    /// Bind the listener and run the accept loop on a coroutine.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the server is already
    /// running.
    pub fn start(self: &Arc<Self>) -> io::Result<ServerHandle> {
        {
            let mut local = self.local_addr.lock().unwrap_or_else(|e| e.into_inner());
            if local.is_some() {
                return Err(io::Error::other("server already running"));
            }
            let listener = TcpListener::bind(self.config.addr)?;
            let addr = listener.local_addr()?;
            *local = Some(addr);
            self.signal.set_wake_addr(addr);
            self.signal.reset();
            info!(addr = %addr, concurrency = ?self.config.concurrency, "server listening");

            let lifecycle = Arc::clone(self);
            let handle = may::go!(move || lifecycle.accept_loop(listener));
            Ok(ServerHandle {
                addr,
                handle,
                lifecycle: Arc::clone(self),
            })
        }
    }

    /// Accept connections until shutdown triggers. The listener is released
    /// on every exit path, normal or not.
    fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        let _guard = ListenerGuard { lifecycle: &self };
        loop {
            let (stream, peer) = match listener.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    if self.signal.is_triggered() {
                        break;
                    }
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };
            // The wake connection from a shutdown trigger lands here too;
            // the flag check drops it without handling.
            if self.signal.is_triggered() {
                break;
            }
            match self.config.concurrency {
                ConcurrencyMode::Sequential => self.handle_connection(stream, peer),
                ConcurrencyMode::PerConnection => {
                    let lifecycle = Arc::clone(&self);
                    let _ = may::go!(move || lifecycle.handle_connection(stream, peer));
                }
            }
        }
        info!("accept loop stopped");
    }

    fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = stream.set_read_timeout(self.config.read_timeout) {
            warn!(error = %e, "failed to arm read timeout");
        }

        let request = match read_request(&mut stream) {
            Ok(req) => req,
            Err(RequestError::Malformed(reason)) => {
                debug!(peer = %peer, reason = %reason, "malformed request");
                let resp = Response::bad_request(&reason);
                if let Err(e) = ResponseWriter::new(&mut stream).send(&resp, self.config.chunk_size)
                {
                    warn!(error = %e, "failed to send 400 response");
                }
                return;
            }
            Err(e) if e.is_disconnect() => {
                debug!(peer = %peer, "client disconnected before sending a request");
                return;
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "failed to read request");
                return;
            }
        };

        let client = ClientInfo::new(peer, &request);
        let handled = self.service.handle(&request, &client);

        if let Err(e) = ResponseWriter::new(&mut stream).send(&handled.response, self.config.chunk_size)
        {
            error!(peer = %peer, error = %e, "failed to write response");
            return;
        }

        if handled.shutdown {
            // The response is flushed; trip the shutdown on its own
            // execution unit, as a thread would in the original design.
            let signal = Arc::clone(&self.signal);
            let _ = may::go!(move || signal.trigger());
        }
    }
}
