// Platform naming rules for native engine modules.

use std::env;
use std::path::{Path, PathBuf};

pub fn host_triplet() -> String {
    format!("{}-{}", env::consts::OS, env::consts::ARCH)
}

pub fn dynamic_lib_extension() -> &'static str {
    match env::consts::OS {
        "windows" => "dll",
        "macos" | "ios" => "dylib",
        _ => "so",
    }
}

pub fn dynamic_lib_prefix() -> &'static str {
    match env::consts::OS {
        "windows" => "",
        _ => "lib",
    }
}

/// `native-lib` -> `libnative-lib.so` on Linux/Android.
pub fn dynamic_lib_filename(name: &str) -> String {
    format!(
        "{}{}.{}",
        dynamic_lib_prefix(),
        name,
        dynamic_lib_extension()
    )
}

/// True when `name` already names a file rather than a bare module.
fn is_explicit_file(name: &str) -> bool {
    let path = Path::new(name);
    path.components().count() > 1
        || path
            .extension()
            .map(|ext| ext == dynamic_lib_extension())
            .unwrap_or(false)
}

/// Ordered list of locations to try for `module`.
///
/// Each search dir is tried first, joined with the platform file name. The
/// bare file name comes last so the system loader can apply its own search
/// path (on Android, the application's native library directory).
pub fn candidate_paths(module: &str, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    if is_explicit_file(module) {
        return vec![PathBuf::from(module)];
    }

    let file_name = dynamic_lib_filename(module);
    let mut candidates: Vec<PathBuf> = search_dirs
        .iter()
        .map(|dir| dir.join(&file_name))
        .collect();
    candidates.push(PathBuf::from(file_name));
    candidates
}
