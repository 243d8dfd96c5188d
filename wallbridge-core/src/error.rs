//! Error types shared by the plugin methods.
//!
//! Every variant is caught at the call boundary and turned into a
//! `{ success: false, message, code }` result; none of them is fatal.

use thiserror::Error;

/// Reasons a wallpaper call can fail.
#[derive(Debug, Error)]
pub enum WallpaperError {
    /// Neither `imageUrl` nor `base64Image` carried usable data.
    #[error("{0}")]
    MissingInput(String),
    /// Malformed base64 or bytes that are not a decodable image.
    #[error("{0}")]
    Decode(String),
    /// Non-2xx HTTP status or a transport failure.
    #[error("{0}")]
    Fetch(String),
    /// The device cannot set wallpapers at all.
    #[error("Wallpaper not supported on this device")]
    PlatformUnsupported,
    /// The OS refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Lock screen requested on an OS release that cannot do it.
    #[error("{0}")]
    UnsupportedOsVersion(String),
    /// Any other failure reported by the wallpaper facility.
    #[error("Error setting wallpaper: {0}")]
    Platform(String),
    /// Plugin configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WallpaperError {
    /// Stable identifier reported to the host next to the message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "MISSING_INPUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Fetch(_) => "FETCH_ERROR",
            Self::PlatformUnsupported => "PLATFORM_UNSUPPORTED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::UnsupportedOsVersion(_) => "UNSUPPORTED_OS_VERSION",
            Self::Platform(_) => "PLATFORM_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<serde_json::Error> for WallpaperError {
    fn from(err: serde_json::Error) -> Self { Self::Config(err.to_string()) }
}

/// Failures reported by a [`crate::platform::WallpaperPlatform`] backend.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("{0}")]
    Failed(String),
}

impl From<PlatformError> for WallpaperError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            PlatformError::Unsupported(_) => Self::PlatformUnsupported,
            PlatformError::Failed(msg) => Self::Platform(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_display() {
        let err = WallpaperError::PermissionDenied("SET_WALLPAPER not granted".to_string());
        assert_eq!(err.to_string(), "Permission denied: SET_WALLPAPER not granted");
    }

    #[test]
    fn test_platform_error_display() {
        let err = WallpaperError::Platform("service died".to_string());
        assert_eq!(err.to_string(), "Error setting wallpaper: service died");
    }

    #[test]
    fn test_unsupported_has_fixed_message() {
        assert_eq!(
            WallpaperError::PlatformUnsupported.to_string(),
            "Wallpaper not supported on this device"
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            WallpaperError::MissingInput(String::new()),
            WallpaperError::Decode(String::new()),
            WallpaperError::Fetch(String::new()),
            WallpaperError::PlatformUnsupported,
            WallpaperError::PermissionDenied(String::new()),
            WallpaperError::UnsupportedOsVersion(String::new()),
            WallpaperError::Platform(String::new()),
            WallpaperError::Config(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(WallpaperError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_platform_error_conversion() {
        let denied: WallpaperError = PlatformError::PermissionDenied("nope".into()).into();
        assert!(matches!(denied, WallpaperError::PermissionDenied(ref m) if m == "nope"));

        let unsupported: WallpaperError = PlatformError::Unsupported("no service".into()).into();
        assert!(matches!(unsupported, WallpaperError::PlatformUnsupported));

        let failed: WallpaperError = PlatformError::Failed("io".into()).into();
        assert_eq!(failed.code(), "PLATFORM_ERROR");
    }
}
