//! # Runtime Configuration Module
//!
//! Coroutine runtime settings loaded from environment variables.
//!
//! ## Environment Variables
//!
//! ### `PETS_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts decimal (`32768`) or
//! hexadecimal (`0x8000`) values. Default: `0x8000` (32 KB).
//!
//! Memory use is roughly `stack_size × concurrent requests`; too small a
//! stack overflows in deep validation of nested bodies.
//!
//! ```rust
//! use brrtpets::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Default coroutine stack size (32 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = env::var("PETS_STACK_SIZE")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` scheduler. Call before any coroutine starts.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Decimal or `0x`-prefixed hexadecimal byte count. Zero is rejected.
fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    };
    parsed.filter(|&size| size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size("0X10000"), Some(0x10000));
        assert_eq!(parse_size(" 32768 "), Some(32768));
        assert_eq!(parse_size("0"), None);
        assert_eq!(parse_size("big"), None);
    }

    #[test]
    fn test_default() {
        assert_eq!(RuntimeConfig::default().stack_size, DEFAULT_STACK_SIZE);
    }
}
