//! Run command implementation

use crate::cli::Cli;
use crate::config::{BarrageConfig, LogFormat, LoggingConfig};
use crate::dispatch::Dispatcher;
use crate::journal::EventJournal;
use crate::metrics::LoadMetrics;
use crate::recorder::ResponseRecorder;
use crate::samples::SampleStore;
use crate::swarm::Swarm;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file used while the dashboard owns the terminal, unless the config
/// names one.
const DASHBOARD_LOG_FILE: &str = "barrage.log";

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(cli: &Cli) -> Result<BarrageConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if cli.config.exists() {
        BarrageConfig::load(Some(&cli.config))?
    } else {
        BarrageConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(ref api) = cli.api {
        config.target.url = api.clone();
    }
    if let Some(bots) = cli.bots {
        config.load.bots = bots;
    }
    if let Some(interval) = cli.interval {
        config.load.interval_seconds = interval;
    }
    if let Some(ref data) = cli.data {
        config.data.path = data.clone();
    }
    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }
    if cli.save_responses {
        config.results.save_responses = true;
    }

    Ok(config)
}

/// Initialize tracing based on configuration.
///
/// When `to_file` is set (dashboard mode), log output goes to the configured
/// log file so it cannot corrupt the terminal UI.
pub fn init_tracing(
    config: &LoggingConfig,
    to_file: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    if to_file {
        let path = config
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DASHBOARD_LOG_FILE));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let writer = std::sync::Mutex::new(file);

        match config.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(writer),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .try_init()?;
            }
        }
    } else {
        match config.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .try_init()?;
            }
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main run handler: wire everything up, fire until cancelled, summarize.
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration; fatal before any UI is shown
    let config = load_config_with_overrides(&cli)?;
    config.validate()?;

    // 2. Initialize tracing (file-backed when the dashboard is active)
    init_tracing(&config.logging, !cli.headless)?;
    tracing::debug!(?config, "Loaded configuration");

    // 3. Load the sample set; any parse error aborts before bots start
    let store = Arc::new(SampleStore::load(&config.data.path)?);

    // 4. Shared run context, injected everywhere (no globals)
    let journal = Arc::new(EventJournal::with_capacity(config.journal.capacity));
    let metrics = Arc::new(LoadMetrics::new());
    journal.append(format!("Loaded {} samples", store.len()));
    tracing::info!(samples = store.len(), path = %config.data.path.display(), "Samples loaded");

    let mut dispatcher = Dispatcher::new(
        config.target.url.clone(),
        Arc::clone(&metrics),
        Arc::clone(&journal),
    );
    if config.results.save_responses {
        // Creating the results directory is fatal here, before any request
        // goes out; later append failures are only logged.
        let recorder = ResponseRecorder::new(&config.results.directory)?;
        tracing::info!(path = %recorder.path().display(), "Persisting response bodies");
        dispatcher = dispatcher.with_recorder(recorder);
    }

    // 5. Start the bots
    let cancel_token = CancellationToken::new();
    let swarm = Swarm::new(
        Arc::new(dispatcher),
        store,
        Arc::clone(&journal),
        config.load.bots,
        Duration::from_secs(config.load.interval_seconds),
    );
    let handle = swarm.start(cancel_token.clone());

    // 6. OS signals cancel the same token the quit key does
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    // 7. Present until cancelled (signal or 'q')
    let ui_result = if cli.headless {
        crate::ui::run_headless(&metrics, cancel_token.clone()).await;
        Ok(())
    } else {
        crate::ui::run_dashboard(&metrics, &journal, cancel_token.clone()).await
    };

    // 8. Wait for every tick loop to exit; in-flight dispatches are not
    // awaited and may record after this point
    handle.shutdown().await;

    if let Err(e) = ui_result {
        tracing::warn!(error = %e, "dashboard exited with an error");
    }

    // 9. Final summary on the restored terminal
    println!("{}", crate::cli::output::format_summary_table(&metrics.snapshot()));

    Ok(())
}
