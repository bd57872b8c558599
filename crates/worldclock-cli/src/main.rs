//! Headless world clock.
//!
//! Loads configuration, restores preferences from the JSON preference file,
//! and runs the clock: faces are written to stdout as JSON lines once per
//! tick, and UI events are read from stdin as JSON lines. The session ends
//! at end of input or on Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `worldclock-config.yaml`
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Open the preference file and wrap it in the persistence gateway
//! 4. Build the app state (hydrate, reconcile, render first frame)
//! 5. Run the event loop until input closes or Ctrl-C
//! 6. Tear down and log the result

mod console_sink;
mod driver;
mod error;

use std::path::Path;

use anyhow::Context as _;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldclock_core::app::ClockApp;
use worldclock_core::clock::SystemClock;
use worldclock_core::config::{AppConfig, LoggingConfig};
use worldclock_store::{JsonFileStore, PersistenceGateway};

use crate::console_sink::ConsoleSink;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "worldclock-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the preference file, app
/// initialization, or the event loop fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&config.logging);

    info!(
        tick_interval_ms = config.clock.tick_interval_ms,
        builtin_zones = config.clock.builtin_zones.len(),
        storage_path = %config.storage.path.display(),
        namespace = config.storage.namespace,
        "configuration loaded"
    );

    let store = JsonFileStore::open(&config.storage.path).with_context(|| {
        format!(
            "failed to open preference file {}",
            config.storage.path.display()
        )
    })?;
    let gateway = PersistenceGateway::new(Box::new(store), &config.storage.namespace);

    let sink = ConsoleSink::new(std::io::stdout());
    let mut app = ClockApp::init(&config, gateway, Box::new(SystemClock), sink)
        .context("failed to initialize world clock")?;

    let input = BufReader::new(tokio::io::stdin());
    let reason = driver::run(&mut app, input).await?;

    info!(?reason, "worldclock shutdown complete");
    Ok(())
}

/// Load configuration from [`CONFIG_FILE`], or defaults if it is absent.
fn load_config() -> anyhow::Result<AppConfig> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        AppConfig::from_file(path).with_context(|| format!("failed to load {CONFIG_FILE}"))
    } else {
        let mut config = AppConfig::default();
        config.storage.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
/// Logs go to stderr so stdout carries only render output.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
