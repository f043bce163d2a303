use anyhow::Context;
use clap::FromArgMatches;
use screenshot_capture::{setup_logging, Cli, CliRunner, Config};
use tracing::info;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let matches = Cli::command_with_presets().get_matches();
    let args = match Cli::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    setup_logging(args.verbose);
    info!("Starting screenshot-capture v{}", env!("CARGO_PKG_VERSION"));

    let result = tokio::select! {
        result = run(&args) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: &Cli) -> anyhow::Result<()> {
    let config = load_config(args).await?;
    let runner = CliRunner::new(config)?;
    runner.run(args).await
}

async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?
    } else {
        Config::default()
    };

    args.apply_overrides(&mut config);
    config.validate()?;

    info!("Navigation timeout: {:?}", config.navigation_timeout);
    info!("Selector timeout: {:?}", config.selector_timeout);
    Ok(config)
}
