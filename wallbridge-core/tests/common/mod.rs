#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;
use std::thread::JoinHandle;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use wallbridge_core::{
    Capabilities, Permission, PermissionRequest, PlatformError, PluginConfig, WallpaperPlatform, WallpaperPlugin,
    WallpaperTarget,
};

/// Platform double that records every wallpaper it is asked to apply.
pub struct RecordingPlatform {
    pub capabilities: Capabilities,
    pub set_wallpaper_granted: bool,
    pub media_granted: bool,
    pub prompt_on_request: bool,
    pub fail_with: Option<fn() -> PlatformError>,
    pub applied: Mutex<Vec<(WallpaperTarget, (u32, u32))>>,
    pub requested: Mutex<Vec<Vec<Permission>>>,
}

impl RecordingPlatform {
    pub fn android(api_level: u32) -> Self {
        Self {
            capabilities: Capabilities::for_android_api(api_level, true),
            set_wallpaper_granted: true,
            media_granted: true,
            prompt_on_request: false,
            fail_with: None,
            applied: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn applied(&self) -> Vec<(WallpaperTarget, (u32, u32))> { self.applied.lock().unwrap().clone() }
}

impl WallpaperPlatform for RecordingPlatform {
    fn capabilities(&self) -> Result<Capabilities, PlatformError> { Ok(self.capabilities) }

    fn permission_granted(&self, permission: Permission) -> Result<bool, PlatformError> {
        Ok(match permission {
            Permission::SetWallpaper => self.set_wallpaper_granted,
            Permission::ReadMediaImages => self.media_granted,
        })
    }

    fn request_permissions(&self, permissions: &[Permission]) -> Result<PermissionRequest, PlatformError> {
        self.requested.lock().unwrap().push(permissions.to_vec());
        Ok(if self.prompt_on_request { PermissionRequest::Prompted } else { PermissionRequest::Completed })
    }

    fn set_wallpaper(&self, image: &DynamicImage, target: WallpaperTarget) -> Result<(), PlatformError> {
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        self.applied.lock().unwrap().push((target, image.dimensions()));
        Ok(())
    }
}

pub fn plugin(platform: RecordingPlatform) -> WallpaperPlugin<RecordingPlatform> {
    WallpaperPlugin::new(PluginConfig::default(), platform)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, 90])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

pub fn png_base64(width: u32, height: u32) -> String { STANDARD.encode(png_bytes(width, height)) }

/// Serves `requests` responses with the given status and body, then exits.
pub fn serve(status: u16, body: Vec<u8>, requests: usize) -> (String, JoinHandle<Vec<(String, String)>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut seen_headers = Vec::new();
        for _ in 0..requests {
            let request = server.recv().unwrap();
            for header in request.headers() {
                seen_headers.push((header.field.to_string(), header.value.to_string()));
            }
            let response = tiny_http::Response::from_data(body.clone()).with_status_code(status);
            // the client may hang up early (size cap, status check)
            let _ = request.respond(response);
        }
        seen_headers
    });
    (format!("http://127.0.0.1:{port}/wallpaper.png"), handle)
}
