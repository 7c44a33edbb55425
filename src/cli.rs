//! Command-line interface.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::chunk::DEFAULT_CHUNK_SIZE;
use crate::server::{ConcurrencyMode, ServerConfig};

/// Task list HTTP server with chunk-streamed responses.
#[derive(Parser, Debug)]
#[command(name = "taskstream")]
#[command(about = "In-memory task list HTTP server", long_about = None)]
pub struct Cli {
    /// Address and port to listen on
    #[arg(long, env = "TASKSTREAM_ADDR", default_value = "0.0.0.0:9000")]
    pub addr: SocketAddr,

    /// Connection scheduling policy
    #[arg(long, value_enum, default_value_t = ConcurrencyMode::Sequential)]
    pub concurrency: ConcurrencyMode,

    /// Characters per body write
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Seconds to wait on a slow client before dropping the read (0 disables)
    #[arg(long, default_value_t = 5)]
    pub read_timeout_secs: u64,
}

impl Cli {
    /// Convert parsed arguments into a server configuration.
    #[must_use]
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            concurrency: self.concurrency,
            chunk_size: self.chunk_size,
            read_timeout: match self.read_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let cli = Cli::parse_from(["taskstream"]);
        let config = cli.into_config();
        assert_eq!(config.addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.concurrency, ConcurrencyMode::Sequential);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "taskstream",
            "--addr",
            "127.0.0.1:8080",
            "--concurrency",
            "per-connection",
            "--chunk-size",
            "10",
            "--read-timeout-secs",
            "0",
        ]);
        let config = cli.into_config();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.concurrency, ConcurrencyMode::PerConnection);
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.read_timeout, None);
    }
}
