//! Data models for the QuizForge application.
//!
//! - [`WizardState`]: the central state container for the upload → configure → results flow
//! - [`study`]: generation options and the request/response payloads exchanged with the backend
//! - [`AppConfig`]: API, default options and logging settings loaded from `QuizForge.yaml`
//!
//! State updates go through [`StateManager`](crate::state::StateManager); the
//! transition methods on [`WizardState`] are pure so they can be tested in isolation.

pub mod config;
pub mod study;
pub mod wizard;

pub use config::{ApiSettings, AppConfig, LoggingSettings};
pub use study::{
    AnswerCheckRequest, CardType, Difficulty, Flashcard, FlashcardRequest, FlashcardResponse,
    GenerationOptions, HealthStatus, QuizQuestion, QuizRequest, QuizResponse, QuizResult,
    SummaryRequest, SummaryResponse, SummaryType, UploadResponse,
};
pub use wizard::{
    FlashcardDeck, QuestionReview, QuizSession, SourceDocument, SourceOrigin, StudyResults,
    UserAnswer, WizardError, WizardState, WizardStep,
};
