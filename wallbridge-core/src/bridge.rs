//! JNI entry points for the Android host shim.
//!
//! The Java side loads this library, calls `init` once with its activity,
//! then forwards every plugin call as `invoke(method, json)` and decodes the
//! returned JSON `CallResult`. When a call comes back `pending`, the shim
//! calls `permissionCallback` after the permission dialog closes.

use std::sync::{Once, OnceLock};

use jni::objects::{JClass, JObject, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde_json::Value;

use crate::config::PluginConfig;
use crate::logging;
use crate::platform::android::AndroidPlatform;
use crate::plugin::{CallResult, WallpaperPlugin};

static CONTEXT_INIT: Once = Once::new();
static PLUGIN: OnceLock<WallpaperPlugin<AndroidPlatform>> = OnceLock::new();

fn plugin() -> &'static WallpaperPlugin<AndroidPlatform> {
    PLUGIN.get_or_init(|| {
        logging::init();
        let config = PluginConfig::load(None).unwrap_or_else(|e| {
            log::warn!("Falling back to default config: {e}");
            PluginConfig::default()
        });
        log::info!("{} ready", crate::plugin::PLUGIN_NAME);
        WallpaperPlugin::new(config, AndroidPlatform)
    })
}

fn into_jstring(env: &mut JNIEnv<'_>, result: &CallResult) -> jstring {
    match env.new_string(result.to_json()) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            log::error!("Failed to create result string: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Registers the JVM and the activity with `ndk_context`.
#[no_mangle]
pub extern "system" fn Java_io_wallbridge_WallpaperBridge_init<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    activity: JObject<'local>,
) {
    logging::init();
    CONTEXT_INIT.call_once(|| {
        let vm = match env.get_java_vm() {
            Ok(vm) => vm,
            Err(e) => {
                log::error!("Failed to get JavaVM: {e}");
                return;
            }
        };
        let activity = match env.new_global_ref(activity) {
            Ok(global) => global,
            Err(e) => {
                log::error!("Failed to pin activity reference: {e}");
                return;
            }
        };
        // the context must outlive every later call, so the global ref is never released
        let context_ptr = activity.as_obj().as_raw();
        std::mem::forget(activity);
        unsafe {
            ndk_context::initialize_android_context(vm.get_java_vm_pointer().cast(), context_ptr.cast());
        }
        log::info!("Android context registered");
    });
}

#[no_mangle]
pub extern "system" fn Java_io_wallbridge_WallpaperBridge_invoke<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JString<'local>,
    data: JString<'local>,
) -> jstring {
    let method: String = match env.get_string(&method) {
        Ok(s) => s.into(),
        Err(e) => {
            let result = CallResult::Rejected { message: format!("Invalid method name: {e}") };
            return into_jstring(&mut env, &result);
        }
    };
    let data: Value = match env.get_string(&data).map(String::from) {
        Ok(raw) if raw.trim().is_empty() => Value::Null,
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                let result = CallResult::Rejected { message: format!("Invalid call data: {e}") };
                return into_jstring(&mut env, &result);
            }
        },
        Err(e) => {
            let result = CallResult::Rejected { message: format!("Invalid call data: {e}") };
            return into_jstring(&mut env, &result);
        }
    };

    let result = plugin().invoke(&method, &data);
    into_jstring(&mut env, &result)
}

#[no_mangle]
pub extern "system" fn Java_io_wallbridge_WallpaperBridge_permissionCallback<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    let result = plugin().permission_callback();
    into_jstring(&mut env, &result)
}
