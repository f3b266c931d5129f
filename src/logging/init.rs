use std::sync::Once;

use log::LevelFilter;

pub const DEFAULT_LOG_TAG: &str = "vkpbr-bridge";

/// Logger configuration.
///
/// `filter` follows the `env_logger` directive syntax (e.g.
/// "vkpbr_bridge=debug") and wins over `level` where the backend supports it.
/// `tag` is only used by the Android backend.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub filter: Option<String>,
    pub tag: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            filter: None,
            tag: DEFAULT_LOG_TAG.to_string(),
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        install(config);
        log::debug!("logging initialized");
    });
}

#[cfg(not(target_os = "android"))]
fn install(config: LoggingConfig) {
    let mut builder = env_logger::Builder::new();
    match config.filter {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(config.level);
        }
    }
    // Another logger may already own the facade (e.g. a test harness).
    let _ = builder.try_init();
}

#[cfg(target_os = "android")]
fn install(config: LoggingConfig) {
    super::android::install(&config.tag, config.level);
}
