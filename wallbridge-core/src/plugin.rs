//! Method table exposed to the host runtime.
//!
//! The host calls [`WallpaperPlugin::invoke`] with a method name and the
//! JSON object it received from the web layer. Every outcome, including
//! failures, is reported as a [`CallResult`]; nothing panics across the
//! boundary.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::acquire::acquire;
use crate::config::PluginConfig;
use crate::error::WallpaperError;
use crate::permissions::{Capabilities, Permission, PermissionGrant, PermissionState};
use crate::platform::{DefaultPlatform, PermissionRequest, WallpaperPlatform};
use crate::source::{ImageSource, WallpaperTarget};

/// Name the host registers the plugin under.
pub const PLUGIN_NAME: &str = "WallpaperPlugin";

type Handler<P> = fn(&WallpaperPlugin<P>, &Value) -> CallResult;

/// What the host should do with a finished call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallResult {
    /// Resolve the host promise with `data`.
    Resolved { data: Value },
    /// Reject the host promise.
    Rejected { message: String },
    /// The OS permission dialog is open; the host answers later through
    /// [`WallpaperPlugin::permission_callback`].
    Pending,
}

impl CallResult {
    fn resolved(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::Resolved { data },
            Err(e) => Self::Rejected { message: e.to_string() },
        }
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| rejection_json(&e.to_string()))
    }
}

fn rejection_json(message: &str) -> String {
    serde_json::json!({ "status": "rejected", "message": message }).to_string()
}

/// `{ success, message }` body of the set-wallpaper methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WallpaperResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl WallpaperResult {
    fn from_outcome(outcome: Result<String, WallpaperError>) -> Self {
        match outcome {
            Ok(message) => Self { success: true, message, code: None },
            Err(err) => Self { success: false, message: err.to_string(), code: Some(err.code()) },
        }
    }
}

/// Parameters of the set-wallpaper methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetWallpaperOptions {
    pub image_url: Option<String>,
    pub base64_image: Option<String>,
}

impl SetWallpaperOptions {
    /// Reads `imageUrl` / `base64Image` from call data. Values that are not
    /// strings count as absent.
    #[must_use]
    pub fn from_call_data(data: &Value) -> Self {
        let string = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
        Self { image_url: string("imageUrl"), base64_image: string("base64Image") }
    }

    #[must_use]
    pub fn url(url: impl Into<String>) -> Self { Self { image_url: Some(url.into()), base64_image: None } }

    #[must_use]
    pub fn base64(data: impl Into<String>) -> Self { Self { image_url: None, base64_image: Some(data.into()) } }
}

/// The wallpaper plugin: configuration, a platform backend, and the method
/// table that maps host method names to handlers.
pub struct WallpaperPlugin<P> {
    config: PluginConfig,
    platform: P,
    methods: HashMap<&'static str, Handler<P>>,
}

impl<P: WallpaperPlatform> WallpaperPlugin<P> {
    pub fn new(config: PluginConfig, platform: P) -> Self {
        let mut methods: HashMap<&'static str, Handler<P>> = HashMap::new();
        methods.insert("setWallpaperHomeScreen", Self::handle_set_home);
        methods.insert("setWallpaperLockScreen", Self::handle_set_lock);
        methods.insert("setBothWallpapers", Self::handle_set_both);
        // older web builds call these names
        methods.insert("setHomeWallpaper", Self::handle_set_home);
        methods.insert("setLockWallpaper", Self::handle_set_lock);
        methods.insert("checkPermissions", Self::handle_check_permissions);
        methods.insert("requestPermissions", Self::handle_request_permissions);

        Self { config, platform, methods }
    }

    pub const fn config(&self) -> &PluginConfig { &self.config }

    pub const fn platform(&self) -> &P { &self.platform }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatches a host call by method name.
    pub fn invoke(&self, method: &str, data: &Value) -> CallResult {
        log::debug!("{method} called");
        match self.methods.get(method) {
            Some(handler) => handler(self, data),
            None => {
                log::warn!("Unknown method {method}");
                CallResult::Rejected { message: format!("\"{method}\" is not implemented on {PLUGIN_NAME}") }
            }
        }
    }

    /// Sets the wallpaper on `target` and returns the success message.
    pub fn set_wallpaper(&self, target: WallpaperTarget, options: &SetWallpaperOptions) -> Result<String, WallpaperError> {
        log::debug!(
            "imageUrl: {}, base64Image: {}",
            options.image_url.as_deref().unwrap_or("null"),
            if options.base64_image.is_some() { "provided" } else { "null" }
        );
        let source = ImageSource::from_options(options.image_url.as_deref(), options.base64_image.as_deref())?;

        let capabilities = self.platform.capabilities()?;
        if target == WallpaperTarget::Lock && !capabilities.lock_screen_supported {
            let message = match capabilities.os_version {
                Some(_) => "Lock screen wallpaper requires Android 7.0 (API 24) or higher",
                None => "Lock screen wallpaper is not available on this platform",
            };
            return Err(WallpaperError::UnsupportedOsVersion(message.to_string()));
        }
        if !capabilities.wallpaper_supported {
            return Err(WallpaperError::PlatformUnsupported);
        }

        let image = acquire(&source, &self.config)?;

        let (effective, message) = match target {
            WallpaperTarget::Home => (WallpaperTarget::Home, "Home screen wallpaper set successfully"),
            WallpaperTarget::Lock => (WallpaperTarget::Lock, "Lock screen wallpaper set successfully"),
            WallpaperTarget::Both if capabilities.lock_screen_supported => {
                (WallpaperTarget::Both, "Wallpaper set successfully for both home and lock screens")
            }
            WallpaperTarget::Both => (
                WallpaperTarget::Home,
                "Wallpaper set successfully for home screen (lock screen not supported on this Android version)",
            ),
        };

        self.platform.set_wallpaper(&image, effective).map_err(|e| {
            log::error!("Error setting {target} wallpaper: {e}");
            WallpaperError::from(e)
        })?;
        log::info!("{message}");
        Ok(message.to_string())
    }

    pub fn check_permissions(&self) -> Result<PermissionState, WallpaperError> {
        let capabilities = self.platform.capabilities()?;
        let (set_wallpaper, media) = self.granted_flags(&capabilities)?;
        let state = PermissionState::new(&capabilities, set_wallpaper, media);
        log::debug!("Permission state: {state:?}");
        Ok(state)
    }

    /// Starts the OS permission flow. `None` means a dialog is showing and
    /// the answer arrives through [`Self::permission_callback`].
    pub fn request_permissions(&self) -> Result<Option<PermissionGrant>, WallpaperError> {
        let capabilities = self.platform.capabilities()?;
        let permissions = capabilities.required_permissions();
        log::info!(
            "Requesting permissions: {}",
            permissions.iter().map(|p| p.alias()).collect::<Vec<_>>().join(", ")
        );
        match self.platform.request_permissions(&permissions)? {
            PermissionRequest::Completed => self.current_grant(&capabilities).map(Some),
            PermissionRequest::Prompted => Ok(None),
        }
    }

    /// Re-reads the permission state once the OS dialog has closed.
    pub fn permission_callback(&self) -> CallResult {
        log::debug!("Permission callback received");
        let grant = self.platform.capabilities().map_err(WallpaperError::from).and_then(|caps| self.current_grant(&caps));
        match grant {
            Ok(grant) => {
                log::debug!("Permissions granted: {}", grant.granted);
                CallResult::resolved(grant)
            }
            Err(e) => CallResult::Rejected { message: format!("Error in permission callback: {e}") },
        }
    }

    fn current_grant(&self, capabilities: &Capabilities) -> Result<PermissionGrant, WallpaperError> {
        let (set_wallpaper, media) = self.granted_flags(capabilities)?;
        Ok(PermissionGrant::new(set_wallpaper, media))
    }

    fn granted_flags(&self, capabilities: &Capabilities) -> Result<(bool, bool), WallpaperError> {
        let set_wallpaper = self.platform.permission_granted(Permission::SetWallpaper)?;
        let media = if capabilities.media_permission_required {
            self.platform.permission_granted(Permission::ReadMediaImages)?
        } else {
            true
        };
        Ok((set_wallpaper, media))
    }

    fn resolve_set(&self, target: WallpaperTarget, data: &Value) -> CallResult {
        let options = SetWallpaperOptions::from_call_data(data);
        CallResult::resolved(WallpaperResult::from_outcome(self.set_wallpaper(target, &options)))
    }

    fn handle_set_home(&self, data: &Value) -> CallResult { self.resolve_set(WallpaperTarget::Home, data) }

    fn handle_set_lock(&self, data: &Value) -> CallResult { self.resolve_set(WallpaperTarget::Lock, data) }

    fn handle_set_both(&self, data: &Value) -> CallResult { self.resolve_set(WallpaperTarget::Both, data) }

    fn handle_check_permissions(&self, _data: &Value) -> CallResult {
        match self.check_permissions() {
            Ok(state) => CallResult::resolved(state),
            Err(e) => CallResult::Rejected { message: format!("Error checking permissions: {e}") },
        }
    }

    fn handle_request_permissions(&self, _data: &Value) -> CallResult {
        match self.request_permissions() {
            Ok(Some(grant)) => CallResult::resolved(grant),
            Ok(None) => CallResult::Pending,
            Err(e) => CallResult::Rejected { message: format!("Error requesting permissions: {e}") },
        }
    }
}

impl WallpaperPlugin<DefaultPlatform> {
    /// Plugin backed by the platform this crate was compiled for.
    #[must_use]
    pub fn with_default_platform(config: PluginConfig) -> Self { Self::new(config, DefaultPlatform::default()) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_options_follow_get_string_semantics() {
        let options = SetWallpaperOptions::from_call_data(&json!({
            "imageUrl": 42,
            "base64Image": "AAAA",
        }));
        assert_eq!(options.image_url, None);
        assert_eq!(options.base64_image.as_deref(), Some("AAAA"));
    }

    #[test]
    fn test_options_from_non_object() {
        assert_eq!(SetWallpaperOptions::from_call_data(&Value::Null), SetWallpaperOptions::default());
    }

    #[test]
    fn test_result_success_omits_code() {
        let result = WallpaperResult::from_outcome(Ok("done".to_string()));
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json, json!({ "success": true, "message": "done" }));
    }

    #[test]
    fn test_result_failure_carries_code() {
        let result = WallpaperResult::from_outcome(Err(WallpaperError::PlatformUnsupported));
        assert!(!result.success);
        assert_eq!(result.message, "Wallpaper not supported on this device");
        assert_eq!(result.code, Some("PLATFORM_UNSUPPORTED"));
    }

    #[test]
    fn test_call_result_json_shape() {
        let resolved = CallResult::Resolved { data: json!({ "success": true }) };
        assert_eq!(
            serde_json::from_str::<Value>(&resolved.to_json()).unwrap(),
            json!({ "status": "resolved", "data": { "success": true } })
        );
        assert_eq!(CallResult::Pending.to_json(), r#"{"status":"pending"}"#);
        let rejected = CallResult::Rejected { message: "boom".to_string() };
        assert_eq!(
            serde_json::from_str::<Value>(&rejected.to_json()).unwrap(),
            json!({ "status": "rejected", "message": "boom" })
        );
    }

    #[test]
    fn test_rejection_json_escapes_message() {
        let raw = rejection_json(r#"key "x" at line 1\col 2"#);
        assert_eq!(
            serde_json::from_str::<Value>(&raw).unwrap(),
            json!({ "status": "rejected", "message": r#"key "x" at line 1\col 2"# })
        );
    }
}
