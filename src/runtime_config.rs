//! Environment-based runtime configuration.
//!
//! `TASKSTREAM_STACK_SIZE` sets the coroutine stack size in bytes, as a
//! decimal (`32768`) or hex (`0x8000`) value. Every connection coroutine
//! pays this, so size it to the handler depth rather than defaulting high.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x8000; // 32 KB

/// Runtime knobs loaded from the environment at startup.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes.
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("TASKSTREAM_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };
        RuntimeConfig { stack_size }
    }
}
