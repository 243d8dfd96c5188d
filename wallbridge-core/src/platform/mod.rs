// Platform seam between the plugin methods and the OS wallpaper facility
use image::DynamicImage;

use crate::error::PlatformError;
use crate::permissions::{Capabilities, Permission};
use crate::source::WallpaperTarget;

#[cfg(target_os = "android")]
pub mod android;
#[cfg(not(target_os = "android"))]
pub mod desktop;

#[cfg(target_os = "android")]
pub use android::AndroidPlatform as DefaultPlatform;
#[cfg(not(target_os = "android"))]
pub use desktop::DesktopPlatform as DefaultPlatform;

/// Outcome of asking the OS for permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    /// Nothing to ask; the current state is final.
    Completed,
    /// A dialog is showing; the host calls back once it closes.
    Prompted,
}

/// The OS wallpaper facility and its permission system.
pub trait WallpaperPlatform: Send + Sync {
    /// Reads what the device supports right now.
    fn capabilities(&self) -> Result<Capabilities, PlatformError>;

    fn permission_granted(&self, permission: Permission) -> Result<bool, PlatformError>;

    /// Starts the OS permission flow for `permissions`.
    fn request_permissions(&self, permissions: &[Permission]) -> Result<PermissionRequest, PlatformError>;

    /// Applies `image` to the given surface(s).
    fn set_wallpaper(&self, image: &DynamicImage, target: WallpaperTarget) -> Result<(), PlatformError>;
}

impl<T: WallpaperPlatform + ?Sized> WallpaperPlatform for Box<T> {
    fn capabilities(&self) -> Result<Capabilities, PlatformError> { (**self).capabilities() }

    fn permission_granted(&self, permission: Permission) -> Result<bool, PlatformError> {
        (**self).permission_granted(permission)
    }

    fn request_permissions(&self, permissions: &[Permission]) -> Result<PermissionRequest, PlatformError> {
        (**self).request_permissions(permissions)
    }

    fn set_wallpaper(&self, image: &DynamicImage, target: WallpaperTarget) -> Result<(), PlatformError> {
        (**self).set_wallpaper(image, target)
    }
}
