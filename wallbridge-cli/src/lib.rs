pub use crate::app::{run, Cli, Command, ImageArgs};

mod app {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{anyhow, Context, Result};
    use clap::{Args, Parser, Subcommand};
    use serde_json::{json, Map, Value};
    use wallbridge_core::{acquire, CallResult, ImageSource, PluginConfig, WallpaperPlugin};

    #[derive(Debug, Parser)]
    #[command(name = "wallbridge")]
    #[command(about = "Set home and lock screen wallpapers from a URL or a base64 image")]
    #[command(version)]
    pub struct Cli {
        /// Plugin config file (JSON); defaults to config.json in the user config dir
        #[arg(long, global = true, value_name = "PATH")]
        pub config: Option<PathBuf>,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Subcommand)]
    pub enum Command {
        /// Set the home screen wallpaper
        Home(ImageArgs),
        /// Set the lock screen wallpaper
        Lock(ImageArgs),
        /// Set both home and lock screen wallpapers
        Both(ImageArgs),
        /// Fetch or decode an image, bound its size and save it without applying it
        Acquire {
            #[command(flatten)]
            image: ImageArgs,
            /// Where to write the normalized image
            #[arg(long, value_name = "PATH")]
            out: PathBuf,
        },
        /// Show the current permission state
        CheckPermissions,
        /// Ask the OS for the permissions wallpapers need
        RequestPermissions,
        /// Call a plugin method by name with raw JSON data
        Invoke {
            method: String,
            #[arg(default_value = "{}")]
            data: String,
        },
        /// List the plugin methods
        Methods,
    }

    #[derive(Debug, Clone, Default, Args)]
    #[group(multiple = false)]
    pub struct ImageArgs {
        /// Image URL to download
        #[arg(long)]
        pub url: Option<String>,
        /// Base64 image, optionally with a data:image/...;base64, prefix
        #[arg(long)]
        pub base64: Option<String>,
        /// File holding a base64 image
        #[arg(long, value_name = "PATH")]
        pub base64_file: Option<PathBuf>,
    }

    impl ImageArgs {
        fn base64_payload(&self) -> Result<Option<String>> {
            if let Some(path) = &self.base64_file {
                let payload = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                return Ok(Some(payload));
            }
            Ok(self.base64.clone())
        }

        /// The `{ imageUrl, base64Image }` object the host would send.
        pub fn call_data(&self) -> Result<Value> {
            let mut data = Map::new();
            if let Some(url) = &self.url {
                data.insert("imageUrl".to_string(), json!(url));
            }
            if let Some(payload) = self.base64_payload()? {
                data.insert("base64Image".to_string(), json!(payload));
            }
            Ok(Value::Object(data))
        }
    }

    /// Runs one command. `Ok(false)` means the plugin reported a failure.
    pub fn run(cli: Cli) -> Result<bool> {
        let config = PluginConfig::load(cli.config.as_deref())?;

        let (method, data) = match cli.command {
            Command::Home(image) => ("setWallpaperHomeScreen".to_string(), image.call_data()?),
            Command::Lock(image) => ("setWallpaperLockScreen".to_string(), image.call_data()?),
            Command::Both(image) => ("setBothWallpapers".to_string(), image.call_data()?),
            Command::CheckPermissions => ("checkPermissions".to_string(), Value::Null),
            Command::RequestPermissions => ("requestPermissions".to_string(), Value::Null),
            Command::Invoke { method, data } => {
                let data = serde_json::from_str(&data).context("Call data is not valid JSON")?;
                (method, data)
            }
            Command::Acquire { image, out } => return acquire_to_file(&config, &image, &out),
            Command::Methods => {
                let plugin = WallpaperPlugin::with_default_platform(config);
                for method in plugin.methods() {
                    println!("{method}");
                }
                return Ok(true);
            }
        };

        let plugin = WallpaperPlugin::with_default_platform(config);
        report(plugin.invoke(&method, &data))
    }

    fn acquire_to_file(config: &PluginConfig, args: &ImageArgs, out: &std::path::Path) -> Result<bool> {
        let base64 = args.base64_payload()?;
        let source = ImageSource::from_options(args.url.as_deref(), base64.as_deref())?;
        let image = acquire(&source, config)?;
        image
            .save(out)
            .with_context(|| format!("Failed to save {}", out.display()))?;
        println!("Saved {}x{} image to {}", image.width(), image.height(), out.display());
        Ok(true)
    }

    fn report(result: CallResult) -> Result<bool> {
        match result {
            CallResult::Resolved { data } => {
                println!("{}", serde_json::to_string_pretty(&data)?);
                Ok(data.get("success").and_then(Value::as_bool).unwrap_or(true))
            }
            CallResult::Rejected { message } => Err(anyhow!(message)),
            CallResult::Pending => {
                println!("Waiting for the permission dialog; run check-permissions once it closes");
                Ok(true)
            }
        }
    }
}
