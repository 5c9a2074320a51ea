//! Services module - framework-agnostic logic behind the study wizard.
//!
//! # Components
//!
//! - [`StudyApi`]: the backend operations (upload, summary, quiz, grading, flashcards,
//!   health) and its HTTP implementation [`HttpStudyApi`]. Failures are [`ApiError`]s
//!   carrying the response status and body.
//! - [`SummaryRenderer`]: tolerant normalisation of backend summary text and
//!   classification into [`SummaryBlock`]s with inline bold spans.
//! - [`validation`]: upload candidates and the PDF-only media type check.
//!
//! None of these touch wizard state; the [`WizardController`](crate::ui::WizardController)
//! wires them together.

pub mod api;
pub mod summary;
pub mod validation;

pub use api::{ApiError, HttpStudyApi, StudyApi};
pub use summary::{RichText, Span, SummaryBlock, SummaryRenderer, render_summary};
pub use validation::{PDF_MEDIA_TYPE, UploadCandidate, validate_upload};
