/// Log tag shown in logcat.
pub const LOG_TAG: &str = "WallpaperPlugin";

/// Installs the platform logger. Safe to call more than once.
#[cfg(target_os = "android")]
pub fn init() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag(LOG_TAG),
    );
}

/// Installs the platform logger. Safe to call more than once.
///
/// Honours `RUST_LOG`; defaults to `info`.
#[cfg(not(target_os = "android"))]
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    // a second call finds the logger already set
    let _ = env_logger::Builder::from_env(env).try_init();
}
