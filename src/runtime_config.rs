//! Runtime tuning from environment variables.
//!
//! `SQLGATE_STACK_SIZE` sets the stack size for the coroutines that serve
//! connections, in decimal (`16384`) or hex (`0x4000`). Row streaming is
//! shallow, but the SQLite engine runs on the serving coroutine's stack,
//! so complex queries may need more than the 16 KB default.

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for serving coroutines in bytes (default: 16 KB / 0x4000).
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = match env::var("SQLGATE_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(0x4000)
                } else {
                    val.parse().unwrap_or(0x4000)
                }
            }
            Err(_) => 0x4000,
        };
        RuntimeConfig { stack_size }
    }
}
