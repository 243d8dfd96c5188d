//! Permission model and the capability snapshot taken once per call.

use serde::Serialize;

/// Android API level that introduced per-surface wallpaper flags (7.0).
pub const LOCK_SCREEN_MIN_API: u32 = 24;
/// Android API level that split image reads into `READ_MEDIA_IMAGES` (13).
pub const MEDIA_PERMISSION_MIN_API: u32 = 33;

/// What the device can do, read once at the start of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub wallpaper_supported: bool,
    pub lock_screen_supported: bool,
    pub media_permission_required: bool,
    pub os_version: Option<u32>,
}

impl Capabilities {
    /// Derives the version-gated flags from an Android API level.
    #[must_use]
    pub const fn for_android_api(api_level: u32, wallpaper_supported: bool) -> Self {
        Self {
            wallpaper_supported,
            lock_screen_supported: api_level >= LOCK_SCREEN_MIN_API,
            media_permission_required: api_level >= MEDIA_PERMISSION_MIN_API,
            os_version: Some(api_level),
        }
    }

    /// Platforms without a lock screen surface or a permission system.
    #[must_use]
    pub const fn home_only() -> Self {
        Self {
            wallpaper_supported: true,
            lock_screen_supported: false,
            media_permission_required: false,
            os_version: None,
        }
    }

    /// Permissions that must be granted on this OS release.
    #[must_use]
    pub fn required_permissions(&self) -> Vec<Permission> {
        let mut permissions = vec![Permission::SetWallpaper];
        if self.media_permission_required {
            permissions.push(Permission::ReadMediaImages);
        }
        permissions
    }
}

/// OS permissions the plugin may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    SetWallpaper,
    ReadMediaImages,
}

impl Permission {
    /// Manifest permission string.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::SetWallpaper => "android.permission.SET_WALLPAPER",
            Self::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
        }
    }

    /// Short alias used by the host when grouping permissions.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::SetWallpaper => "wallpaper",
            Self::ReadMediaImages => "media",
        }
    }
}

/// Snapshot returned by `checkPermissions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionState {
    pub has_permission: bool,
    pub is_wallpaper_supported: bool,
    pub has_set_wallpaper_permission: bool,
    pub has_media_permission: bool,
    #[serde(rename = "androidVersion", skip_serializing_if = "Option::is_none")]
    pub os_version: Option<u32>,
}

impl PermissionState {
    #[must_use]
    pub const fn new(capabilities: &Capabilities, set_wallpaper_granted: bool, media_granted: bool) -> Self {
        Self {
            has_permission: capabilities.wallpaper_supported && set_wallpaper_granted && media_granted,
            is_wallpaper_supported: capabilities.wallpaper_supported,
            has_set_wallpaper_permission: set_wallpaper_granted,
            has_media_permission: media_granted,
            os_version: capabilities.os_version,
        }
    }
}

/// Result delivered once the permission dialog has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub granted: bool,
    pub has_set_wallpaper_permission: bool,
    pub has_media_permission: bool,
}

impl PermissionGrant {
    #[must_use]
    pub const fn new(set_wallpaper_granted: bool, media_granted: bool) -> Self {
        Self {
            granted: set_wallpaper_granted && media_granted,
            has_set_wallpaper_permission: set_wallpaper_granted,
            has_media_permission: media_granted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_gates() {
        let nougat = Capabilities::for_android_api(24, true);
        assert!(nougat.lock_screen_supported);
        assert!(!nougat.media_permission_required);

        let marshmallow = Capabilities::for_android_api(23, true);
        assert!(!marshmallow.lock_screen_supported);

        let tiramisu = Capabilities::for_android_api(33, true);
        assert!(tiramisu.media_permission_required);
        assert_eq!(tiramisu.os_version, Some(33));
    }

    #[test]
    fn test_required_permissions() {
        assert_eq!(
            Capabilities::for_android_api(30, true).required_permissions(),
            vec![Permission::SetWallpaper]
        );
        assert_eq!(
            Capabilities::for_android_api(34, true).required_permissions(),
            vec![Permission::SetWallpaper, Permission::ReadMediaImages]
        );
    }

    #[test]
    fn test_permission_names() {
        assert_eq!(Permission::SetWallpaper.manifest_name(), "android.permission.SET_WALLPAPER");
        assert_eq!(Permission::ReadMediaImages.alias(), "media");
    }

    #[test]
    fn test_state_requires_all_flags() {
        let caps = Capabilities::for_android_api(33, true);
        assert!(PermissionState::new(&caps, true, true).has_permission);
        assert!(!PermissionState::new(&caps, true, false).has_permission);
        assert!(!PermissionState::new(&caps, false, true).has_permission);

        let unsupported = Capabilities::for_android_api(33, false);
        assert!(!PermissionState::new(&unsupported, true, true).has_permission);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = PermissionState::new(&Capabilities::for_android_api(28, true), true, true);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["hasPermission"], true);
        assert_eq!(json["isWallpaperSupported"], true);
        assert_eq!(json["hasSetWallpaperPermission"], true);
        assert_eq!(json["hasMediaPermission"], true);
        assert_eq!(json["androidVersion"], 28);
        assert!(json.get("osVersion").is_none());
    }

    #[test]
    fn test_state_omits_unknown_version() {
        let state = PermissionState::new(&Capabilities::home_only(), true, true);
        let json = serde_json::to_value(state).unwrap();
        assert!(json.get("androidVersion").is_none());
    }

    #[test]
    fn test_grant() {
        assert!(PermissionGrant::new(true, true).granted);
        assert!(!PermissionGrant::new(true, false).granted);
    }
}
