//! Image acquisition and normalization.
//!
//! Turns an [`ImageSource`] into a decoded raster no larger than the
//! configured maximum dimension. The URL path makes exactly one blocking
//! request; nothing is retried and nothing is written to disk.

use std::io::Read;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::PluginConfig;
use crate::error::WallpaperError;
use crate::source::ImageSource;

const DATA_URL_MARKER: &str = "data:image";

/// Standard alphabet, padding optional, non-zero trailing bits accepted.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Fetches or decodes the image and bounds it to `config.max_dimension`.
pub fn acquire(source: &ImageSource, config: &PluginConfig) -> Result<DynamicImage, WallpaperError> {
    log::debug!("Acquiring image from {source}");
    let image = match source {
        ImageSource::Base64(data) => decode_base64_image(data)?,
        ImageSource::Url(url) => fetch_image(url, config)?,
    };
    Ok(normalize(image, config.max_dimension))
}

/// Returns the payload after a `data:image...,` header, or the input
/// unchanged when it has none.
pub fn strip_data_url_prefix(data: &str) -> Result<&str, WallpaperError> {
    if !data.starts_with(DATA_URL_MARKER) {
        return Ok(data);
    }
    log::debug!("Removing data URL prefix");
    data.split_once(',')
        .map(|(_, payload)| payload)
        .ok_or_else(|| decode_error("data URL has no ',' separator"))
}

/// Decodes a base64 payload (optionally data-URL prefixed) into an image.
pub fn decode_base64_image(data: &str) -> Result<DynamicImage, WallpaperError> {
    log::debug!("Decoding base64 image, length: {}", data.len());
    let payload = strip_data_url_prefix(data.trim())?;

    // line-wrapped payloads are common; whitespace is not part of the alphabet
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(decode_error("base64 string is empty"));
    }

    let bytes = LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| decode_error(&format!("invalid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(decode_error("no bytes produced"));
    }
    log::debug!("Decoded bytes length: {}", bytes.len());

    let image = image::load_from_memory(&bytes).map_err(|e| decode_error(&e.to_string()))?;
    log::debug!("Decoded bitmap: {}x{}", image.width(), image.height());
    Ok(image)
}

/// Downloads and decodes an image with a single GET.
pub fn fetch_image(url: &str, config: &PluginConfig) -> Result<DynamicImage, WallpaperError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(WallpaperError::MissingInput("URL is null or empty".to_string()));
    }

    log::info!("Downloading image from {url}");
    let response = attohttpc::get(url)
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .header(attohttpc::header::ACCEPT, "image/*")
        .try_header(attohttpc::header::USER_AGENT, config.user_agent.as_str())
        .and_then(|request| request.send())
        .map_err(|e| fetch_error(&e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        log::error!("HTTP error code: {}", status.as_u16());
        return Err(fetch_error(&format!("HTTP error code: {}", status.as_u16())));
    }

    // the reader owns the connection; it is closed when dropped on any path
    let (_, _, reader) = response.split();
    let limit = config.max_download_bytes;
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| fetch_error(&e.to_string()))?;
    if bytes.len() as u64 > limit {
        return Err(fetch_error(&format!("response larger than {limit} bytes")));
    }

    let image = image::load_from_memory(&bytes).map_err(|e| {
        log::error!("Failed to decode bitmap from stream: {e}");
        WallpaperError::Decode(format!("Failed to decode image downloaded from URL: {e}"))
    })?;
    log::debug!("Downloaded bitmap: {}x{}", image.width(), image.height());
    Ok(image)
}

/// Target size for an image whose longest side may exceed `cap`.
///
/// Both sides are scaled by `min(cap / width, cap / height)` and rounded to
/// the nearest pixel. Dimensions already within the cap are returned as is.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bounded_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    if width <= cap && height <= cap {
        return (width, height);
    }
    let cap_f = f64::from(cap);
    let scale = f64::min(cap_f / f64::from(width), cap_f / f64::from(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, cap);
    (scaled(width), scaled(height))
}

/// Downsamples `image` so neither side exceeds `cap`. Never upscales.
#[must_use]
pub fn normalize(image: DynamicImage, cap: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = bounded_dimensions(width, height, cap);
    if (new_width, new_height) == (width, height) {
        return image;
    }
    log::debug!("Resizing large bitmap from {width}x{height} to {new_width}x{new_height}");
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

fn decode_error(detail: &str) -> WallpaperError {
    log::error!("Failed to decode base64 image: {detail}");
    WallpaperError::Decode(format!("Failed to decode base64 image: {detail}"))
}

fn fetch_error(detail: &str) -> WallpaperError {
    WallpaperError::Fetch(format!("Failed to download image from URL: {detail}"))
}
