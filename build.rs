use std::env;

const DEFAULT_ENGINE_MODULE: &str = "native-lib";

fn main() {
    let module =
        env::var("VKPBR_ENGINE_MODULE").unwrap_or_else(|_| DEFAULT_ENGINE_MODULE.to_string());

    if module.trim().is_empty() {
        panic!("VKPBR_ENGINE_MODULE is set but empty. Unset it or name the engine library.");
    }
    if module.contains('/') || module.contains('\\') {
        panic!("Engine module name '{module}' must be a bare library name, not a path.");
    }

    println!("cargo:rustc-env=VKPBR_ENGINE_MODULE={module}");
    println!("cargo:rerun-if-env-changed=VKPBR_ENGINE_MODULE");
}
