//! Wallpaper bridge plugin.
//!
//! Sets the home and/or lock screen wallpaper from an image URL or a base64
//! payload. A host runtime forwards method calls to [`WallpaperPlugin::invoke`];
//! the plugin acquires and bounds the image, then hands it to the
//! [`WallpaperPlatform`] backend for the current OS.

pub mod acquire;
pub mod config;
pub mod error;
pub mod logging;
pub mod permissions;
pub mod platform;
pub mod plugin;
pub mod source;

#[cfg(target_os = "android")]
mod bridge;

pub use acquire::{acquire, bounded_dimensions, normalize};
pub use config::PluginConfig;
pub use error::{PlatformError, WallpaperError};
pub use permissions::{Capabilities, Permission, PermissionGrant, PermissionState};
pub use platform::{DefaultPlatform, PermissionRequest, WallpaperPlatform};
pub use plugin::{CallResult, SetWallpaperOptions, WallpaperPlugin, WallpaperResult, PLUGIN_NAME};
pub use source::{ImageSource, WallpaperTarget};
