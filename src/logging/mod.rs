//! Logging setup.
//!
//! Library code only talks to the `log` facade. The backend is picked per
//! target: `env_logger` on desktop hosts, the platform log on Android.

#[cfg(target_os = "android")]
mod android;
mod init;

pub use init::{init_logging, LoggingConfig};
