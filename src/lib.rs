// QuizForge - Summaries, quizzes and flashcards from study material
//
// This is the library crate containing the wizard state machine, the backend
// client and the summary renderer. The binary crate (main.rs) provides the
// terminal entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::SessionMetrics;
pub use models::{AppConfig, GenerationOptions, WizardError, WizardState, WizardStep};
pub use services::{ApiError, HttpStudyApi, StudyApi, SummaryBlock, SummaryRenderer};
pub use state::{StateChange, StateManager};
pub use ui::WizardController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
