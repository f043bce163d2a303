use crate::{
    device_names, format_duration, format_kilobytes, generate_filename, production_size_names,
    resolve_size, CaptureOptions, Config, OutputFormat, ProductionOptions, ScreenshotService,
    DEFAULT_PRODUCTION_SIZES,
};
use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

pub const DEFAULT_URL: &str = "http://example.com/";
pub const DEFAULT_DEVICE: &str = "mobile";
pub const DEFAULT_DELAY_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "screenshot-capture")]
#[command(about = "Capture website screenshots in device and production sizes")]
#[command(version)]
pub struct Cli {
    #[arg(default_value = DEFAULT_URL, help = "Website URL")]
    pub url: String,

    #[arg(default_value = DEFAULT_DEVICE, help = "Device preset")]
    pub device: String,

    #[arg(long, value_name = "NAME", help = "Production size preset for a single fixed-size capture")]
    pub size: Option<String>,

    #[arg(long, help = "Generate all common production sizes from one render")]
    pub production: bool,

    #[arg(long, value_name = "DIR", help = "Output directory (default: ./screenshots)")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Png, help = "Output image format")]
    pub format: OutputFormat,

    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(0..=100), help = "JPEG quality")]
    pub quality: u8,

    #[arg(
        long,
        value_name = "MS",
        help = "Settle time after load in milliseconds (default: 1000, or 0 with --production)"
    )]
    pub delay: Option<u64>,

    #[arg(long, value_name = "SELECTOR", help = "CSS selector to wait for before capturing")]
    pub wait_for: Option<String>,

    #[arg(long, help = "Do not block media, websocket and tracking requests")]
    pub allow_all: bool,

    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, value_name = "SECS", help = "Navigation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

impl Cli {
    /// Clap command with the preset names appended to `--help`.
    pub fn command_with_presets() -> clap::Command {
        Self::command().after_help(format!(
            "Devices: {}\nProduction sizes available: {}",
            device_names().join(", "),
            production_size_names().join(", ")
        ))
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(chrome_path) = &self.chrome_path {
            config.chrome_path = Some(chrome_path.clone());
        }

        if let Some(timeout) = self.timeout {
            config.navigation_timeout = Duration::from_secs(timeout);
        }
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            format: self.format,
            quality: self.quality,
            full_page: true,
            wait_for_selector: self.wait_for.clone(),
            delay: Duration::from_millis(self.delay.unwrap_or(self.default_delay_ms())),
            block_resources: !self.allow_all,
            ..Default::default()
        }
    }

    /// Production renders settle on network idle alone unless `--delay` is given.
    fn default_delay_ms(&self) -> u64 {
        if self.production {
            0
        } else {
            DEFAULT_DELAY_MS
        }
    }

    pub fn output_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.output {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()
                .context("Failed to resolve current directory")?
                .join("screenshots")),
        }
    }
}

pub struct CliRunner {
    pub service: ScreenshotService,
}

impl CliRunner {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let service = ScreenshotService::new(config)?;
        Ok(Self { service })
    }

    pub fn with_service(service: ScreenshotService) -> Self {
        Self { service }
    }

    pub async fn run(&self, args: &Cli) -> anyhow::Result<()> {
        println!("Capturing screenshot of: {}", args.url);
        println!("Device preset: {}", args.device);

        let output_dir = args.output_dir()?;

        if args.production {
            self.run_production(args, output_dir).await
        } else if let Some(size) = &args.size {
            self.run_sized(args, size, output_dir).await
        } else {
            self.run_full_page(args, output_dir).await
        }
    }

    pub async fn run_production(&self, args: &Cli, output_dir: PathBuf) -> anyhow::Result<()> {
        println!("Mode: Production (multiple sizes)");

        let options = ProductionOptions {
            output_dir,
            capture: args.capture_options(),
        };

        let start = Instant::now();
        let results = self
            .service
            .capture_production(&args.url, &args.device, DEFAULT_PRODUCTION_SIZES, &options)
            .await?;

        for result in &results {
            println!("✓ {} ({}): {}", result.size_key, result.size, result.file_size());
        }

        println!("\nProduction screenshots captured successfully!");
        println!("Total files: {}", results.len());
        println!("Duration: {}", format_duration(start.elapsed()));
        println!("Saved to: {}", options.output_dir.display());

        Ok(())
    }

    pub async fn run_sized(&self, args: &Cli, size_key: &str, output_dir: PathBuf) -> anyhow::Result<()> {
        let size = resolve_size(size_key)?;
        println!("Mode: Production size ({size_key})");

        let filename = generate_filename(&args.url, &args.device, args.format, Some(size_key))?;
        let output_path = output_dir.join(filename);
        let options = CaptureOptions {
            output_path: Some(output_path.clone()),
            fixed_size: Some(size),
            ..args.capture_options()
        };

        let start = Instant::now();
        let screenshot = self.service.capture(&args.url, &args.device, &options).await?;

        println!("Screenshot captured successfully!");
        println!("Size: {size} ({size_key})");
        println!("File size: {}", format_kilobytes(screenshot.len()));
        println!("Duration: {}", format_duration(start.elapsed()));
        println!("Saved to: {}", output_path.display());

        Ok(())
    }

    pub async fn run_full_page(&self, args: &Cli, output_dir: PathBuf) -> anyhow::Result<()> {
        println!("Mode: Full page screenshot");

        let filename = generate_filename(&args.url, &args.device, args.format, None)?;
        let output_path = output_dir.join(filename);
        let options = CaptureOptions {
            output_path: Some(output_path.clone()),
            ..args.capture_options()
        };

        let start = Instant::now();
        let screenshot = self.service.capture(&args.url, &args.device, &options).await?;
        info!("Full page capture finished");

        println!("Screenshot captured successfully!");
        println!("File size: {}", format_kilobytes(screenshot.len()));
        println!("Duration: {}", format_duration(start.elapsed()));
        println!("Saved to: {}", output_path.display());

        Ok(())
    }
}

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
