// vkpbr bridge library entry point.
// Binds the native rendering engine and owns the activity lifecycle hooks,
// exported over JNI when built for Android.

pub mod binding;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod native;

#[cfg(target_os = "android")]
pub mod android;

pub use binding::{ensure_loaded, EngineBinding, EngineHandle, ModuleLoader, SystemLoader};
pub use config::{BridgeConfig, ExitPolicy, ENGINE_MODULE_NAME};
pub use error::{BindingError, BridgeError, BridgeResult, LoadError};
pub use lifecycle::{ActivityHost, ImmediateExit, LifecycleBridge, ProcessExit, SessionState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> String {
    format!("vkpbr-bridge v{}", VERSION)
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION.to_string(),
        engine_module: ENGINE_MODULE_NAME.to_string(),
        target_os: std::env::consts::OS.to_string(),
        target_arch: std::env::consts::ARCH.to_string(),
        features: get_enabled_features(),
    }
}

/// Build information structure
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: String,
    pub engine_module: String,
    pub target_os: String,
    pub target_arch: String,
    pub features: Vec<String>,
}

fn get_enabled_features() -> Vec<String> {
    #[allow(unused_mut)]
    let mut features = vec!["binding".to_string()];

    #[cfg(target_os = "android")]
    features.push("android-jni".to_string());

    features
}
