// Android host integration.
//
// The activity shim under `android/` declares `onCreate` and `onBackPressed`
// as native overrides; `jni_bridge` implements them and `JNI_OnLoad`.

pub mod jni_bridge;

pub use jni_bridge::JniActivityHost;
