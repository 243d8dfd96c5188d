use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat};

use super::{PermissionRequest, WallpaperPlatform};
use crate::config::project_dirs;
use crate::error::PlatformError;
use crate::permissions::{Capabilities, Permission};
use crate::source::WallpaperTarget;

const FILE_PREFIX: &str = "wallpaper-";

/// Desktop backend built on the `wallpaper` crate.
///
/// Desktops have no separate lock screen surface and no runtime permission
/// prompts. The normalized image is written to the cache directory because
/// desktop environments only accept a file path.
#[derive(Debug, Clone)]
pub struct DesktopPlatform {
    cache_dir: PathBuf,
}

impl Default for DesktopPlatform {
    fn default() -> Self { Self::new() }
}

impl DesktopPlatform {
    #[must_use]
    pub fn new() -> Self {
        let cache_dir = project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("wallbridge"));
        Self::with_cache_dir(cache_dir)
    }

    #[must_use]
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self { Self { cache_dir: cache_dir.into() } }

    #[must_use]
    pub fn cache_dir(&self) -> &Path { &self.cache_dir }

    /// Writes `image` as a fresh PNG in the cache directory and drops the
    /// files left by earlier calls. A new name on every call makes desktop
    /// environments that cache by path pick up the change.
    pub fn store_image(&self, image: &DynamicImage) -> Result<PathBuf, PlatformError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| PlatformError::Failed(format!("{}: {e}", self.cache_dir.display())))?;
        self.remove_stale_images();

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = self.cache_dir.join(format!("{FILE_PREFIX}{stamp}.png"));
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| PlatformError::Failed(format!("Failed to save wallpaper image: {e}")))?;
        Ok(path)
    }

    fn remove_stale_images(&self) {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return;
        };
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            let is_ours = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(".png"));
            if is_ours {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Failed to remove old wallpaper {}: {e}", path.display());
                }
            }
        }
    }
}

impl WallpaperPlatform for DesktopPlatform {
    fn capabilities(&self) -> Result<Capabilities, PlatformError> { Ok(Capabilities::home_only()) }

    fn permission_granted(&self, _permission: Permission) -> Result<bool, PlatformError> { Ok(true) }

    fn request_permissions(&self, _permissions: &[Permission]) -> Result<PermissionRequest, PlatformError> {
        Ok(PermissionRequest::Completed)
    }

    fn set_wallpaper(&self, image: &DynamicImage, target: WallpaperTarget) -> Result<(), PlatformError> {
        if target.includes_lock() {
            return Err(PlatformError::Unsupported("lock screen wallpaper is not available on desktop".to_string()));
        }

        let path = self.store_image(image)?;
        let file_loc = path.to_string_lossy();
        wallpaper::set_from_path(&file_loc).map_err(|e| PlatformError::Failed(e.to_string()))?;
        log::info!("Wallpaper set successfully to: {file_loc}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    #[test]
    fn test_store_image_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DesktopPlatform::with_cache_dir(dir.path().join("cache"));
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 4));

        let first = platform.store_image(&image).unwrap();
        assert!(first.exists());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = platform.store_image(&image).unwrap();

        assert!(second.exists());
        assert!(!first.exists());
        assert_eq!(image::open(&second).unwrap().width(), 8);
    }

    #[test]
    fn test_store_image_keeps_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("notes.txt");
        fs::write(&keep, "x").unwrap();

        let platform = DesktopPlatform::with_cache_dir(dir.path());
        platform.store_image(&DynamicImage::ImageRgb8(RgbImage::new(2, 2))).unwrap();
        assert!(keep.exists());
    }

    #[test]
    fn test_desktop_capabilities() {
        let platform = DesktopPlatform::with_cache_dir(std::env::temp_dir());
        let caps = platform.capabilities().unwrap();
        assert!(caps.wallpaper_supported);
        assert!(!caps.lock_screen_supported);
        assert!(platform.permission_granted(Permission::SetWallpaper).unwrap());
        assert_eq!(
            platform.request_permissions(&[Permission::SetWallpaper]).unwrap(),
            PermissionRequest::Completed
        );
    }

    #[test]
    fn test_lock_target_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DesktopPlatform::with_cache_dir(dir.path().join("cache"));
        let err = platform
            .set_wallpaper(&DynamicImage::ImageRgb8(RgbImage::new(2, 2)), WallpaperTarget::Lock)
            .unwrap_err();
        assert!(matches!(err, PlatformError::Unsupported(_)));
        assert!(!platform.cache_dir().exists());
    }
}
