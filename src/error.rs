use std::path::{Path, PathBuf};

use thiserror::Error;

/// A single candidate location could not be mapped.
#[derive(Debug, Clone, Error)]
#[error("{}", render_load_error(.path, .reason))]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The native engine could not be bound. Startup must not continue.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    #[error("native engine module `{module}` could not be mapped ({})", describe_failures(.failures))]
    ModuleUnavailable {
        module: String,
        failures: Vec<LoadError>,
    },
    #[error("native engine module `{module}` at {location} does not export `{symbol}`")]
    MissingEntryPoint {
        module: String,
        location: PathBuf,
        symbol: String,
    },
}

/// Platform loader messages usually name the path already.
fn render_load_error(path: &Path, reason: &str) -> String {
    let path_text = path.display().to_string();
    if reason.contains(path_text.as_str()) {
        reason.to_string()
    } else {
        format!("{path_text}: {reason}")
    }
}

fn describe_failures(failures: &[LoadError]) -> String {
    if failures.is_empty() {
        return "no candidate locations".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("lifecycle session already exiting; callback ignored")]
    SessionTerminated,
    #[error("host callback failed: {0}")]
    Host(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_lists_every_candidate() {
        let err = BindingError::ModuleUnavailable {
            module: "native-lib".into(),
            failures: vec![
                LoadError::new("/opt/libnative-lib.so", "not found"),
                LoadError::new("libnative-lib.so", "undefined symbol: vkCreateInstance"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("`native-lib`"));
        assert!(text.contains("/opt/libnative-lib.so: not found"));
        assert!(text.contains("undefined symbol: vkCreateInstance"));
    }

    #[test]
    fn path_is_not_repeated_when_the_loader_names_it() {
        let err = LoadError::new(
            "libnative-lib.so",
            "libnative-lib.so: cannot open shared object file: No such file or directory",
        );
        assert_eq!(
            err.to_string(),
            "libnative-lib.so: cannot open shared object file: No such file or directory"
        );

        let bare = LoadError::new("/opt/libnative-lib.so", "not found");
        assert_eq!(bare.to_string(), "/opt/libnative-lib.so: not found");
    }

    #[test]
    fn binding_errors_convert_into_bridge_errors() {
        let err: BridgeError = BindingError::ModuleUnavailable {
            module: "native-lib".into(),
            failures: Vec::new(),
        }
        .into();
        assert!(matches!(err, BridgeError::Binding(_)));
        assert!(err.to_string().contains("no candidate locations"));
    }
}
