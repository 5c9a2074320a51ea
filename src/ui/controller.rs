// Wizard Controller - Drives the study wizard against the backend
//
// This module contains the WizardController which coordinates between:
// - StateManager (wizard state)
// - StudyApi (backend requests)
// - SummaryRenderer (display blocks for the stored summary)
// - SessionMetrics (usage counters)
//
// Every operation validates locally first, issues at most the requests it
// needs, and records the outcome through the StateManager. Failures are
// written to the state's error banner and returned; nothing is fatal.

use crate::metrics::SessionMetrics;
use crate::models::{
    FlashcardDeck, FlashcardRequest, HealthStatus, QuizRequest, QuizResult, StudyResults,
    SummaryRequest, WizardError, WizardState, WizardStep,
};
use crate::services::api::{ApiError, StudyApi};
use crate::services::summary::{SummaryBlock, SummaryRenderer};
use crate::services::validation::{UploadCandidate, validate_upload};
use crate::state::StateManager;
use camino::Utf8Path;
use std::sync::Arc;
use std::time::Instant;

/// Controller for the upload → configure → results flow
///
/// The front end calls these methods in response to user actions and renders
/// from [`StateManager`] snapshots.
///
/// # Example
/// ```ignore
/// let state = Arc::new(StateManager::new());
/// let api = Arc::new(HttpStudyApi::new(&config.api)?);
/// let controller = WizardController::new(state, api, Arc::new(SessionMetrics::new()));
///
/// controller.submit_pasted_text("Photosynthesis is ...")?;
/// controller.generate().await?;
/// ```
#[derive(Clone)]
pub struct WizardController {
    state: Arc<StateManager>,
    api: Arc<dyn StudyApi>,
    metrics: Arc<SessionMetrics>,
    renderer: SummaryRenderer,
}

impl WizardController {
    pub fn new(
        state: Arc<StateManager>,
        api: Arc<dyn StudyApi>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            state,
            api,
            metrics,
            renderer: SummaryRenderer::new(),
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }

    pub fn snapshot(&self) -> WizardState {
        self.state.snapshot()
    }

    /// Surface a locally detected problem in the error banner.
    fn reject(&self, err: WizardError) -> WizardError {
        tracing::warn!("Rejected: {}", err);
        self.metrics.record_validation_rejection();
        self.state.set_error(err.to_string());
        err
    }

    /// Surface a backend failure in the error banner.
    fn fail(&self, err: ApiError) -> WizardError {
        tracing::error!("Backend request failed: {}", err);
        self.metrics.record_api_failure();
        self.state.set_error(err.to_string());
        WizardError::Api(err)
    }

    // -----------------------------------------------------------------------
    // Upload step
    // -----------------------------------------------------------------------

    /// Send a PDF to the backend for text extraction and continue to configure.
    ///
    /// Non-PDF files are rejected without a request.
    pub async fn upload_document(&self, candidate: UploadCandidate) -> Result<(), WizardError> {
        tracing::info!(
            "File selected: {} ({} bytes, {})",
            candidate.name,
            candidate.size_bytes(),
            candidate.media_type
        );

        self.state
            .read(|s| s.require_step(WizardStep::Upload))
            .map_err(|e| self.reject(e))?;
        validate_upload(&candidate).map_err(|e| self.reject(e))?;

        self.state.begin_request();
        let started = Instant::now();
        let response = self.api.upload_document(&candidate).await;
        self.metrics.record_api_calls(1, started.elapsed());

        let response = response.map_err(|e| self.fail(e))?;
        tracing::info!(
            "Upload complete: {} ({} words extracted)",
            response.filename,
            response.word_count
        );

        let size = candidate.size_bytes();
        self.state
            .try_update(|s| {
                s.loading = false;
                s.accept_upload(candidate.name, size, response.text_content)
            })
            .map_err(|e| self.reject(e))?;
        self.metrics.record_upload();
        Ok(())
    }

    /// Read a local file and upload it.
    pub async fn upload_path(&self, path: &Utf8Path) -> Result<(), WizardError> {
        let candidate = UploadCandidate::from_path(path).map_err(|e| self.reject(e))?;
        self.upload_document(candidate).await
    }

    /// Use pasted text as the study material and continue to configure.
    pub fn submit_pasted_text(&self, text: &str) -> Result<(), WizardError> {
        self.state
            .try_update(|s| {
                s.error = None;
                s.accept_pasted_text(text)
            })
            .map_err(|e| self.reject(e))?;
        tracing::info!("Pasted text accepted ({} characters)", text.trim().len());
        Ok(())
    }

    /// Return to configure with the material that is already loaded.
    pub fn continue_to_configure(&self) -> Result<(), WizardError> {
        self.state
            .try_update(|s| s.continue_to_configure())
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    // -----------------------------------------------------------------------
    // Configure step
    // -----------------------------------------------------------------------

    pub fn update_options<F>(&self, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut crate::models::GenerationOptions),
    {
        self.state
            .update_options(edit)
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    /// Generate the summary and the quiz together and show the results.
    ///
    /// Both requests run concurrently. If either fails the whole round is
    /// discarded: the wizard stays on configure with the failure in the banner.
    pub async fn generate(&self) -> Result<(), WizardError> {
        let (summary_request, quiz_request) = self
            .state
            .read(|s| -> Result<_, WizardError> {
                s.require_step(WizardStep::Configure)?;
                let source = s.source.as_ref().filter(|_| s.has_source()).ok_or(WizardError::NoSource)?;
                s.options.validate().map_err(WizardError::InvalidOptions)?;

                let subject = s.options.subject.trim().to_string();
                let summary = SummaryRequest {
                    text_content: source.text.clone(),
                    summary_type: s.options.summary_type,
                    subject: Some(subject.clone()).filter(|subject| !subject.is_empty()),
                };
                let quiz = QuizRequest {
                    text_content: source.text.clone(),
                    num_questions: s.options.num_questions,
                    subject,
                    difficulty: s.options.difficulty,
                    previous_score: None,
                };
                Ok((summary, quiz))
            })
            .map_err(|e| self.reject(e))?;

        tracing::info!(
            "Generating {} summary and {}-question {} quiz",
            summary_request.summary_type,
            quiz_request.num_questions,
            quiz_request.difficulty
        );

        self.state.begin_request();
        let started = Instant::now();
        let joined = tokio::try_join!(
            self.api.generate_summary(&summary_request),
            self.api.generate_quiz(&quiz_request),
        );
        self.metrics.record_api_calls(2, started.elapsed());

        let (summary, quiz) = joined.map_err(|e| self.fail(e))?;
        tracing::info!(
            "Generated summary ({} words) and quiz ({} questions, ~{} min)",
            summary.word_count,
            quiz.questions.len(),
            quiz.estimated_time
        );

        let stored = self.state.try_update(|s| {
            s.require_step(WizardStep::Configure)?;
            s.loading = false;
            s.accept_results(StudyResults { summary, quiz });
            Ok(())
        });
        if let Err(e) = stored {
            // The wizard moved on while the requests were in flight
            tracing::warn!("Discarding generated content: {}", e);
            self.state.end_request();
            return Err(e);
        }

        self.metrics.record_generation();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Manual back-navigation; stored results are kept.
    pub fn back(&self) {
        self.state.update(|s| s.back());
    }

    /// Forward to results when a generation round is already stored.
    pub fn show_results(&self) -> Result<(), WizardError> {
        self.state
            .try_update(|s| s.show_results())
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    /// Clear everything and start over at upload.
    pub fn reset(&self) {
        tracing::info!("Resetting wizard");
        self.state.reset();
    }

    pub fn dismiss_error(&self) {
        self.state.clear_error();
    }

    // -----------------------------------------------------------------------
    // Results: summary
    // -----------------------------------------------------------------------

    /// Display blocks for the stored summary, if any.
    pub fn rendered_summary(&self) -> Option<Vec<SummaryBlock>> {
        self.state.read(|s| {
            s.summary()
                .map(|summary| self.renderer.render(&summary.summary, summary.layout()))
        })
    }

    // -----------------------------------------------------------------------
    // Results: quiz
    // -----------------------------------------------------------------------

    /// Record an answer. Re-selecting replaces the earlier answer for that question.
    pub fn select_answer(&self, index: usize, option: &str) -> Result<(), WizardError> {
        self.state
            .try_update(|s| s.select_answer(index, option))
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    pub fn next_question(&self) {
        self.state.update(|s| s.next_question());
    }

    pub fn previous_question(&self) {
        self.state.update(|s| s.previous_question());
    }

    /// Send the answers for grading.
    ///
    /// Does nothing (and returns [`WizardError::QuizIncomplete`]) until every
    /// question has an answer. On failure the answers are kept for a retry.
    pub async fn submit_quiz(&self) -> Result<QuizResult, WizardError> {
        let request = self.state.read(|s| s.answer_check_request())?;

        tracing::info!("Submitting {} answers for grading", request.user_answers.len());
        self.state.begin_request();
        let started = Instant::now();
        let result = self.api.check_answers(&request).await;
        self.metrics.record_api_calls(1, started.elapsed());

        let result = result.map_err(|e| self.fail(e))?;
        tracing::info!(
            "Quiz graded: {:.0}% ({}/{}), passed={}",
            result.score,
            result.correct_answers,
            result.total_questions,
            result.passed
        );

        self.state.update(|s| {
            s.loading = false;
            s.quiz_session.result = Some(result.clone());
        });
        self.metrics.record_quiz_graded();
        Ok(result)
    }

    /// Clear answers and grading and go back to the first question.
    pub fn retake_quiz(&self) -> Result<(), WizardError> {
        self.state
            .try_update(|s| s.retake_quiz())
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    /// Ask for a new quiz on the same material, passing the last score so the
    /// backend can adapt the difficulty.
    pub async fn regenerate_quiz(&self) -> Result<(), WizardError> {
        let request = self
            .state
            .read(|s| -> Result<_, WizardError> {
                s.quiz().ok_or(WizardError::NoQuiz)?;
                let source = s.source.as_ref().ok_or(WizardError::NoSource)?;
                Ok(QuizRequest {
                    text_content: source.text.clone(),
                    num_questions: s.options.num_questions,
                    subject: s.options.subject.trim().to_string(),
                    difficulty: s.options.difficulty,
                    previous_score: s.quiz_session.previous_score(),
                })
            })
            .map_err(|e| self.reject(e))?;

        tracing::info!(
            "Regenerating quiz (previous score: {:?})",
            request.previous_score
        );
        self.state.begin_request();
        let started = Instant::now();
        let quiz = self.api.generate_quiz(&request).await;
        self.metrics.record_api_calls(1, started.elapsed());

        let quiz = quiz.map_err(|e| self.fail(e))?;
        self.state
            .try_update(|s| {
                s.loading = false;
                s.replace_quiz(quiz)
            })
            .map_err(|e| self.reject(e))?;
        self.metrics.record_generation();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Results: flashcards
    // -----------------------------------------------------------------------

    /// Generate a flashcard deck from the loaded material.
    pub async fn generate_flashcards(&self) -> Result<(), WizardError> {
        let request = self
            .state
            .read(|s| -> Result<_, WizardError> {
                let source = s.source.as_ref().filter(|_| s.has_source()).ok_or(WizardError::NoSource)?;
                s.options.validate().map_err(WizardError::InvalidOptions)?;
                Ok(FlashcardRequest {
                    text_content: source.text.clone(),
                    num_cards: s.options.num_cards,
                    subject: s.options.subject.trim().to_string(),
                    card_type: s.options.card_type,
                })
            })
            .map_err(|e| self.reject(e))?;

        tracing::info!(
            "Generating {} {} flashcards",
            request.num_cards,
            request.card_type
        );
        self.state.begin_request();
        let started = Instant::now();
        let response = self.api.generate_flashcards(&request).await;
        self.metrics.record_api_calls(1, started.elapsed());

        let response = response.map_err(|e| self.fail(e))?;
        tracing::info!("Received {} flashcards", response.flashcards.len());

        self.state.update(|s| {
            s.loading = false;
            s.flashcards = Some(FlashcardDeck::new(response));
        });
        self.metrics.record_flashcard_deck();
        Ok(())
    }

    /// Turn a card over; returns whether it now shows its back.
    pub fn flip_card(&self, index: usize) -> Result<bool, WizardError> {
        self.state
            .try_update(|s| {
                s.flashcards
                    .as_mut()
                    .ok_or(WizardError::NoFlashcards)?
                    .flip(index)
            })
            .map(|(flipped, _)| flipped)
            .map_err(|e| self.reject(e))
    }

    pub fn clear_flashcards(&self) {
        self.state.update(|s| {
            s.flashcards = None;
            s.error = None;
        });
    }

    // -----------------------------------------------------------------------
    // Backend
    // -----------------------------------------------------------------------

    pub async fn health_check(&self) -> Result<HealthStatus, WizardError> {
        let started = Instant::now();
        let status = self.api.health_check().await;
        self.metrics.record_api_calls(1, started.elapsed());

        let status = status.map_err(|e| self.fail(e))?;
        tracing::info!("Backend health: {} ({})", status.status, status.service);
        Ok(status)
    }
}
