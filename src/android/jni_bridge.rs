// JNI entry points for the viewer activity.

use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard, PoisonError};

use jni::objects::{JObject, JValue};
use jni::sys::{jint, JNI_ERR, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use log::{error, info};

use crate::binding;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::lifecycle::{ActivityHost, ImmediateExit, LifecycleBridge};
use crate::logging;

const ACTIVITY_SUPERCLASS: &str = "android/app/NativeActivity";
const ILLEGAL_STATE: &str = "java/lang/IllegalStateException";

// ========================================
// Global bridge state
// ========================================

static BRIDGE: Mutex<Option<LifecycleBridge<'static, ImmediateExit>>> = Mutex::new(None);

fn bridge_slot() -> MutexGuard<'static, Option<LifecycleBridge<'static, ImmediateExit>>> {
    BRIDGE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn jni_failure(err: jni::errors::Error) -> BridgeError {
    BridgeError::Host(format!("jni: {err}"))
}

// ========================================
// Host adapter
// ========================================

/// Routes the bridge's "default behaviour" calls to the `NativeActivity`
/// superclass implementations on the current activity object.
pub struct JniActivityHost<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    activity: &'a JObject<'local>,
}

impl<'a, 'local> JniActivityHost<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, activity: &'a JObject<'local>) -> Self {
        Self { env, activity }
    }
}

impl<'a, 'local> ActivityHost for JniActivityHost<'a, 'local> {
    type SavedState = JObject<'local>;

    fn default_on_create(&mut self, saved_state: JObject<'local>) -> BridgeResult<()> {
        self.env.call_nonvirtual_method(
            self.activity,
            ACTIVITY_SUPERCLASS,
            "onCreate",
            "(Landroid/os/Bundle;)V",
            &[JValue::Object(&saved_state)],
        )
        .map_err(jni_failure)?;
        Ok(())
    }

    fn default_on_back_pressed(&mut self) -> BridgeResult<()> {
        let result = self.env.call_nonvirtual_method(
            self.activity,
            ACTIVITY_SUPERCLASS,
            "onBackPressed",
            "()V",
            &[],
        );
        // Exit follows regardless; later JNI calls need no pending exception.
        if result.is_err() && self.env.exception_check().unwrap_or(false) {
            let _ = self.env.exception_describe();
            let _ = self.env.exception_clear();
        }
        result.map_err(jni_failure)?;
        Ok(())
    }

    fn request_collection(&mut self) -> BridgeResult<bool> {
        self.env
            .call_static_method("java/lang/System", "gc", "()V", &[])
            .map_err(jni_failure)?;
        Ok(true)
    }
}

fn throw_unbound(env: &mut JNIEnv) {
    error!("lifecycle callback arrived before the engine was bound");
    if let Err(err) = env.throw_new(ILLEGAL_STATE, "native engine is not bound") {
        error!("failed to raise IllegalStateException: {err}");
    }
}

// ========================================
// JNI exports
// ========================================

/// Binds the engine when the shim's static initialiser loads this library.
/// Returning `JNI_ERR` fails the class load, so the activity never starts.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    let config = BridgeConfig::default();
    logging::init_logging(config.logging.clone());
    info!("{} loading", crate::version());

    match LifecycleBridge::bind(binding::engine(), ImmediateExit, config.exit) {
        Ok(bridge) => {
            *bridge_slot() = Some(bridge);
            JNI_VERSION_1_6
        }
        Err(err) => {
            error!("startup aborted: {err}");
            log::logger().flush();
            JNI_ERR
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_vkpbr_viewer_ViewerActivity_onCreate<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
    saved_state: JObject<'local>,
) {
    let mut slot = bridge_slot();
    let Some(bridge) = slot.as_mut() else {
        throw_unbound(&mut env);
        return;
    };

    let mut host = JniActivityHost::new(&mut env, &activity);
    // A failed superclass call leaves its Java exception pending; it is
    // rethrown to the host when this native method returns.
    if let Err(err) = bridge.on_create(&mut host, saved_state) {
        error!("onCreate failed: {err}");
    }
}

#[no_mangle]
pub extern "system" fn Java_com_vkpbr_viewer_ViewerActivity_onBackPressed<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
) {
    let mut slot = bridge_slot();
    let Some(bridge) = slot.as_mut() else {
        throw_unbound(&mut env);
        return;
    };

    let mut host = JniActivityHost::new(&mut env, &activity);
    bridge.on_back_pressed(&mut host)
}
