//! Image request parsing.

use std::fmt;

use crate::error::WallpaperError;

/// Where the wallpaper image comes from. Exactly one per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
}

impl ImageSource {
    /// Builds a source from the two optional call parameters.
    ///
    /// A non-blank base64 payload wins over a URL. Both absent, or both
    /// present but blank, is a `MissingInput` failure.
    pub fn from_options(
        image_url: Option<&str>,
        base64_image: Option<&str>,
    ) -> Result<Self, WallpaperError> {
        if image_url.is_none() && base64_image.is_none() {
            return Err(WallpaperError::MissingInput(
                "Must provide either imageUrl or base64Image".to_string(),
            ));
        }

        if let Some(data) = base64_image.filter(|s| !s.trim().is_empty()) {
            return Ok(Self::Base64(data.to_string()));
        }
        if let Some(url) = image_url.filter(|s| !s.trim().is_empty()) {
            return Ok(Self::Url(url.trim().to_string()));
        }

        Err(WallpaperError::MissingInput("Invalid image data provided".to_string()))
    }
}

impl fmt::Display for ImageSource {
    // base64 payloads can be megabytes long; only their size goes to logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url {url}"),
            Self::Base64(data) => write!(f, "base64 payload ({} chars)", data.len()),
        }
    }
}

/// Screen surface(s) a wallpaper is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperTarget {
    Home,
    Lock,
    Both,
}

impl WallpaperTarget {
    /// Android `WallpaperManager.FLAG_SYSTEM`.
    pub const FLAG_SYSTEM: i32 = 1;
    /// Android `WallpaperManager.FLAG_LOCK`.
    pub const FLAG_LOCK: i32 = 2;

    #[must_use]
    pub const fn flags(self) -> i32 {
        match self {
            Self::Home => Self::FLAG_SYSTEM,
            Self::Lock => Self::FLAG_LOCK,
            Self::Both => Self::FLAG_SYSTEM | Self::FLAG_LOCK,
        }
    }

    #[must_use]
    pub const fn includes_lock(self) -> bool { matches!(self, Self::Lock | Self::Both) }
}

impl fmt::Display for WallpaperTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::Lock => "lock",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}
