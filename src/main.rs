//! QuizForge - Summaries, quizzes and flashcards from study material
//!
//! Main entry point for the terminal application.
//!
//! # Overview
//!
//! This binary crate provides the interactive terminal front end. It initializes:
//! - Configuration loading ([`ConfigManager`]) with CLI overrides
//! - Logging infrastructure (daily file rotation + optional stderr output)
//! - Tokio async runtime for backend requests
//! - State management ([`StateManager`])
//! - The wizard controller and [`TerminalApp`]
//!
//! The application uses a simple threading model:
//! - **Main thread**: Runs the prompt loop and blocks on controller futures
//! - **Tokio workers**: Drive HTTP requests (summary and quiz run concurrently)
//! - **State listener**: Background task that logs state change events
//!
//! # Execution Flow
//!
//! 1. Parse CLI arguments
//! 2. Load `QuizForge.yaml` (defaults → file → `QUIZFORGE_*` environment)
//! 3. Initialize logging → logs/quizforge.<date>
//! 4. Create tokio runtime with 2 worker threads
//! 5. Create StateManager and load default generation options
//! 6. Create HTTP client and WizardController
//! 7. Run the terminal wizard (blocks until the user quits)
//! 8. Log session metrics and shut down the runtime with a 2s timeout

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use quizforge::services::validation::clean_input_path;
use quizforge::ui::TerminalApp;
use quizforge::{
    APP_NAME, ConfigManager, HttpStudyApi, SessionMetrics, StateManager, VERSION,
    WizardController,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(
    name = "quizforge",
    version,
    about = "Turn study material into summaries, quizzes and flashcards"
)]
struct Cli {
    /// Directory holding QuizForge.yaml
    #[arg(long, env = "QUIZFORGE_CONFIG_DIR", default_value = "QuizForge Data")]
    config_dir: Utf8PathBuf,

    /// Backend base URL (overrides api.base_url)
    #[arg(long)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Mirror logs to stderr
    #[arg(long)]
    console_log: bool,

    /// PDF to upload before the wizard starts
    #[arg(long, conflicts_with = "text")]
    file: Option<String>,

    /// Study text to use before the wizard starts
    #[arg(long)]
    text: Option<String>,

    /// Check that the backend is reachable and exit
    #[arg(long)]
    health: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so the log settings can come from it
    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let created = config_manager.ensure_config_file()?;
    let mut config = config_manager.load_config()?;

    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    config.logging.debug |= cli.debug;
    config.logging.console |= cli.console_log;

    let _log_guard = quizforge::logging::init_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if created {
        tracing::info!("Wrote default config to {}", config_manager.config_path());
    }
    tracing::info!("Backend: {}", config.api.base_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("quizforge-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 2);

    let state_manager = Arc::new(StateManager::new());
    state_manager.load_from_config(&config);

    // Log every state change in the background
    let mut changes = state_manager.subscribe();
    runtime.spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => tracing::debug!("State change: {:?}", change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("State listener lagged, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let api = Arc::new(HttpStudyApi::new(&config.api)?);
    let metrics = Arc::new(SessionMetrics::new());
    let controller = WizardController::new(state_manager.clone(), api, metrics.clone());
    let app = TerminalApp::new(controller, runtime.handle().clone());

    let result = if cli.health {
        if app.check_backend() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Backend at {} is not reachable",
                config.api.base_url
            ))
        }
    } else {
        if let Some(file) = &cli.file {
            app.load_file(&clean_input_path(file));
        } else if let Some(text) = &cli.text {
            app.load_text(text);
        }
        app.run()
    };

    tracing::info!("Wizard closed, shutting down");
    metrics.log_summary();

    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("Terminal error: {}", e);
        e
    })
}
