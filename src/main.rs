use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskstream::cli::Cli;
use taskstream::runtime_config::RuntimeConfig;
use taskstream::server::ServerLifecycle;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let server = ServerLifecycle::instance(config);
    let handle = server.start()?;
    info!(addr = %handle.addr(), "taskstream running");

    #[cfg(unix)]
    spawn_signal_handler(server);

    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server failed: {e:?}"))?;
    info!("server stopped");
    Ok(())
}

/// Translate SIGINT/SIGTERM into a graceful shutdown.
#[cfg(unix)]
fn spawn_signal_handler(server: &'static std::sync::Arc<ServerLifecycle>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    std::thread::spawn(move || {
        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install signal handler");
                return;
            }
        };
        if let Some(signal) = signals.forever().next() {
            info!(signal, "signal received, shutting down");
            server.shutdown();
        }
    });
}
