use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use saga::api::ApiClient;
use saga::app::{App, AppEvent};
use saga::config::Config;
use saga::theme::ThemeVariant;
use saga::ui;

/// Get the config directory path (~/.config/saga/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("saga"))
}

#[derive(Parser, Debug)]
#[command(name = "saga", about = "Terminal dashboard for impact stories")]
struct Args {
    /// Base URL of the stories API (overrides SAGA_API_URL and config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Theme to start with ("dark" or "light"; overrides config file)
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,
}

/// Resolve the API base URL: flag, then env var, then config file.
///
/// This is the one piece of required configuration; the process fails fast
/// with a usage hint when it is absent or not a usable http(s) URL.
fn resolve_api_url(args: &Args, config: &Config) -> Result<String> {
    let candidate = args
        .api_url
        .clone()
        .or_else(|| std::env::var("SAGA_API_URL").ok())
        .or_else(|| config.api_url.clone());

    let Some(raw) = candidate else {
        eprintln!("Error: No API base URL configured.");
        eprintln!();
        eprintln!("Provide one via any of:");
        eprintln!("  saga --api-url https://stories.example.org");
        eprintln!("  SAGA_API_URL=https://stories.example.org saga");
        eprintln!("  api_url = \"https://stories.example.org\" in ~/.config/saga/config.toml");
        std::process::exit(1);
    };

    let parsed = url::Url::parse(&raw)
        .with_context(|| format!("Invalid API base URL '{}'", raw))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => anyhow::bail!(
            "Invalid API base URL '{}': unsupported scheme '{}' (http/https only)",
            raw,
            scheme
        ),
    }

    Ok(raw)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = config_dir.join("config.toml");
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let api_url = resolve_api_url(&args, &config)?;
    tracing::info!(api_url = %api_url, "Using stories API");

    // Connection pooling and keepalive: the whole session talks to one host
    let http_client = reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;

    let client = ApiClient::new(http_client, api_url);
    let mut app = App::new(client);

    let theme_name = args.theme.as_deref().unwrap_or(&config.theme);
    match ThemeVariant::from_str_name(theme_name) {
        Some(variant) => app.set_theme(variant),
        None => tracing::warn!(theme = %theme_name, "Unknown theme name, using Dark"),
    }

    // Channel for background task results
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
