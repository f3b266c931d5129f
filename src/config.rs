//! Bridge configuration.
//!
//! Everything here is assembled in code. The bridge owns no configuration
//! files, flags or environment variables; the only build input is the engine
//! module name baked in by `build.rs`.

use std::path::PathBuf;

use crate::logging::LoggingConfig;

/// Name of the native engine module, fixed at build time.
pub const ENGINE_MODULE_NAME: &str = env!("VKPBR_ENGINE_MODULE");

/// Entry point the native-activity host calls once the module is mapped.
pub const NATIVE_ACTIVITY_ENTRY: &str = "ANativeActivity_onCreate";

/// What the Exiting transition does after the host's own back handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    pub code: i32,
    pub collect_before_exit: bool,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            code: 0,
            collect_before_exit: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub engine_module: String,
    pub search_dirs: Vec<PathBuf>,
    pub required_symbols: Vec<String>,
    pub exit: ExitPolicy,
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_module: ENGINE_MODULE_NAME.to_string(),
            search_dirs: Vec::new(),
            required_symbols: vec![NATIVE_ACTIVITY_ENTRY.to_string()],
            exit: ExitPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_engine_module(mut self, module: impl Into<String>) -> Self {
        self.engine_module = module.into();
        self
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_required_symbol(mut self, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        if !self.required_symbols.contains(&symbol) {
            self.required_symbols.push(symbol);
        }
        self
    }

    /// Drops every required entry point, including the native-activity one.
    pub fn without_required_symbols(mut self) -> Self {
        self.required_symbols.clear();
        self
    }

    pub fn with_exit_policy(mut self, exit: ExitPolicy) -> Self {
        self.exit = exit;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
