use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use jni::objects::{JObject, JThrowable, JValue};
use jni::{JNIEnv, JavaVM};

use super::{PermissionRequest, WallpaperPlatform};
use crate::error::PlatformError;
use crate::permissions::{Capabilities, Permission, LOCK_SCREEN_MIN_API};
use crate::source::WallpaperTarget;

/// `Context.checkSelfPermission` result for a granted permission.
const PERMISSION_GRANTED: i32 = 0;
/// Request code handed to `Activity.requestPermissions`.
const PERMISSION_REQUEST_CODE: i32 = 0x5750;
/// `isWallpaperSupported` and runtime permissions both arrived in API 23.
const RUNTIME_PERMISSIONS_MIN_API: i32 = 23;

/// Android backend talking to `WallpaperManager` over JNI.
///
/// Uses the JVM and context registered with `ndk_context`, either by
/// `android-activity` or by the bridge's `init` entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidPlatform;

impl AndroidPlatform {
    fn with_env<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T, PlatformError>,
    ) -> Result<T, PlatformError> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { JavaVM::from_raw(ctx.vm() as _) }
            .map_err(|_| PlatformError::Failed("Expected to find JVM via ndk_context crate".to_string()))?;
        let context = unsafe { JObject::from_raw(ctx.context() as _) };
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| PlatformError::Failed(format!("Failed to attach current thread: {e}")))?;
        f(&mut *env, &context)
    }
}

fn sdk_int(env: &mut JNIEnv<'_>) -> Result<i32, PlatformError> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .and_then(|v| v.i())
        .map_err(|e| java_error(env, "Failed to read SDK_INT", e))
}

fn wallpaper_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>, PlatformError> {
    env.call_static_method(
        "android/app/WallpaperManager",
        "getInstance",
        "(Landroid/content/Context;)Landroid/app/WallpaperManager;",
        &[JValue::Object(context)],
    )
    .and_then(|v| v.l())
    .map_err(|e| java_error(env, "Failed to get WallpaperManager", e))
}

fn check_permission(env: &mut JNIEnv<'_>, context: &JObject<'_>, permission: Permission) -> Result<bool, PlatformError> {
    if sdk_int(env)? < RUNTIME_PERMISSIONS_MIN_API {
        // granted at install time
        return Ok(true);
    }
    let name = env
        .new_string(permission.manifest_name())
        .map_err(|e| java_error(env, "Failed to create permission string", e))?;
    let status = env
        .call_method(context, "checkSelfPermission", "(Ljava/lang/String;)I", &[JValue::Object(&name)])
        .and_then(|v| v.i())
        .map_err(|e| java_error(env, "checkSelfPermission failed", e))?;
    Ok(status == PERMISSION_GRANTED)
}

/// Turns a JNI failure into a [`PlatformError`], clearing any pending Java
/// exception. `SecurityException` becomes `PermissionDenied`.
fn java_error(env: &mut JNIEnv<'_>, what: &str, err: jni::errors::Error) -> PlatformError {
    if !matches!(err, jni::errors::Error::JavaException) {
        return PlatformError::Failed(format!("{what}: {err}"));
    }

    let Ok(throwable) = env.exception_occurred() else {
        return PlatformError::Failed(what.to_string());
    };
    let _ = env.exception_clear();

    let message = throwable_message(env, &throwable).unwrap_or_else(|| "unknown Java exception".to_string());
    if env.is_instance_of(&throwable, "java/lang/SecurityException").unwrap_or(false) {
        log::error!("Security error: {message}");
        PlatformError::PermissionDenied(message)
    } else {
        log::error!("{what}: {message}");
        PlatformError::Failed(format!("{what}: {message}"))
    }
}

fn throwable_message(env: &mut JNIEnv<'_>, throwable: &JThrowable<'_>) -> Option<String> {
    let value = env
        .call_method(throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .ok()?;
    if value.is_null() {
        return None;
    }
    let text = jni::objects::JString::from(value);
    env.get_string(&text).ok().map(Into::into)
}

impl WallpaperPlatform for AndroidPlatform {
    fn capabilities(&self) -> Result<Capabilities, PlatformError> {
        self.with_env(|env, context| {
            let sdk = sdk_int(env)?;
            let supported = if sdk >= RUNTIME_PERMISSIONS_MIN_API {
                let manager = wallpaper_manager(env, context)?;
                env.call_method(&manager, "isWallpaperSupported", "()Z", &[])
                    .and_then(|v| v.z())
                    .map_err(|e| java_error(env, "isWallpaperSupported failed", e))?
            } else {
                true
            };
            log::debug!("Wallpaper supported: {supported}, SDK {sdk}");
            Ok(Capabilities::for_android_api(u32::try_from(sdk).unwrap_or(0), supported))
        })
    }

    fn permission_granted(&self, permission: Permission) -> Result<bool, PlatformError> {
        self.with_env(|env, context| {
            let granted = check_permission(env, context, permission)?;
            log::debug!("{} permission: {granted}", permission.manifest_name());
            Ok(granted)
        })
    }

    fn request_permissions(&self, permissions: &[Permission]) -> Result<PermissionRequest, PlatformError> {
        self.with_env(|env, context| {
            let mut missing = Vec::new();
            for &permission in permissions {
                if !check_permission(env, context, permission)? {
                    missing.push(permission);
                }
            }
            if missing.is_empty() {
                return Ok(PermissionRequest::Completed);
            }

            let len = i32::try_from(missing.len()).unwrap_or(i32::MAX);
            let array = env
                .new_object_array(len, "java/lang/String", JObject::null())
                .map_err(|e| java_error(env, "Failed to create permission array", e))?;
            for (index, permission) in (0..len).zip(&missing) {
                let name = env
                    .new_string(permission.manifest_name())
                    .map_err(|e| java_error(env, "Failed to create permission string", e))?;
                env.set_object_array_element(&array, index, name)
                    .map_err(|e| java_error(env, "Failed to fill permission array", e))?;
            }

            log::info!("Requesting {} permission(s)", missing.len());
            env.call_method(
                context,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&array), JValue::Int(PERMISSION_REQUEST_CODE)],
            )
            .map_err(|e| java_error(env, "requestPermissions failed", e))?;
            Ok(PermissionRequest::Prompted)
        })
    }

    fn set_wallpaper(&self, image: &DynamicImage, target: WallpaperTarget) -> Result<(), PlatformError> {
        let mut encoded = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| PlatformError::Failed(format!("Failed to encode bitmap: {e}")))?;

        self.with_env(|env, context| {
            let manager = wallpaper_manager(env, context)?;
            let bytes = env
                .byte_array_from_slice(&encoded)
                .map_err(|e| java_error(env, "Failed to create Java byte array", e))?;
            let stream = env
                .new_object("java/io/ByteArrayInputStream", "([B)V", &[JValue::Object(&bytes)])
                .map_err(|e| java_error(env, "Failed to create input stream", e))?;

            let sdk = sdk_int(env)?;
            if sdk >= LOCK_SCREEN_MIN_API as i32 {
                let id = env
                    .call_method(
                        &manager,
                        "setStream",
                        "(Ljava/io/InputStream;Landroid/graphics/Rect;ZI)I",
                        &[
                            JValue::Object(&stream),
                            JValue::Object(&JObject::null()),
                            JValue::from(true),
                            JValue::Int(target.flags()),
                        ],
                    )
                    .and_then(|v| v.i())
                    .map_err(|e| java_error(env, "setStream failed", e))?;
                if id == 0 {
                    return Err(PlatformError::Failed("WallpaperManager rejected the image".to_string()));
                }
            } else {
                env.call_method(&manager, "setStream", "(Ljava/io/InputStream;)V", &[JValue::Object(&stream)])
                    .map_err(|e| java_error(env, "setStream failed", e))?;
            }

            log::info!("Wallpaper applied to {target} ({} bytes)", encoded.len());
            Ok(())
        })
    }
}
