use crate::models::study::{
    Flashcard, FlashcardResponse, GenerationOptions, QuizQuestion, QuizResponse, QuizResult,
    SummaryResponse,
};
use crate::services::api::ApiError;
use std::fmt;
use thiserror::Error;

/// Steps of the upload → configure → results flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Upload,
    Configure,
    Results,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upload => "upload",
            Self::Configure => "configure",
            Self::Results => "results",
        };
        f.write_str(name)
    }
}

/// Errors raised by wizard transitions.
///
/// Everything except [`WizardError::Api`] is an input-validation error and is
/// raised before any network call is made.
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Please select a PDF file ({name} is {media_type})")]
    UnsupportedFileType { name: String, media_type: String },

    #[error("Please enter some text content")]
    EmptyText,

    #[error("No study material loaded yet")]
    NoSource,

    #[error("No text could be extracted from {0}")]
    NoExtractedText(String),

    #[error("{0}")]
    InvalidOptions(String),

    #[error("This action is only available on the {expected} step (currently on {actual})")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("No quiz has been generated")]
    NoQuiz,

    #[error("Question {index} does not exist (quiz has {total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("\"{option}\" is not an option for question {index}")]
    UnknownOption { index: usize, option: String },

    #[error("Answer all questions before submitting ({answered}/{total} answered)")]
    QuizIncomplete { answered: usize, total: usize },

    #[error("The quiz has already been graded; retake it to change answers")]
    AlreadyGraded,

    #[error("No flashcards have been generated")]
    NoFlashcards,

    #[error("Flashcard {index} does not exist (deck has {total} cards)")]
    CardOutOfRange { index: usize, total: usize },

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WizardError {
    /// True for errors detected locally, before any request was issued.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Api(_))
    }
}

/// Where the working text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    Upload { name: String, size_bytes: u64 },
    Pasted,
}

/// The study material every generation request is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub text: String,
    pub origin: SourceOrigin,
}

impl SourceDocument {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// File name for uploads, "pasted text" otherwise.
    pub fn display_name(&self) -> &str {
        match &self.origin {
            SourceOrigin::Upload { name, .. } => name,
            SourceOrigin::Pasted => "pasted text",
        }
    }
}

/// Summary and quiz produced by one generation round.
///
/// Both are stored together so a half-finished generation cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyResults {
    pub summary: SummaryResponse,
    pub quiz: QuizResponse,
}

/// One recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAnswer {
    pub question_index: usize,
    pub selected_option: String,
}

/// Per-question outcome shown after grading.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub is_correct: bool,
}

/// Answer tracking for the current quiz.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizSession {
    pub answers: Vec<UserAnswer>,
    pub current_question: usize,
    pub result: Option<QuizResult>,
}

impl QuizSession {
    /// Record `option` for `index`, replacing any earlier answer in place.
    ///
    /// Returns `true` if the recorded answers changed.
    pub fn select(&mut self, index: usize, option: &str) -> bool {
        match self.answers.iter_mut().find(|a| a.question_index == index) {
            Some(existing) if existing.selected_option == option => false,
            Some(existing) => {
                existing.selected_option = option.to_string();
                true
            }
            None => {
                self.answers.push(UserAnswer {
                    question_index: index,
                    selected_option: option.to_string(),
                });
                true
            }
        }
    }

    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_index == index)
            .map(|a| a.selected_option.as_str())
    }

    pub fn is_complete(&self, total_questions: usize) -> bool {
        total_questions > 0 && self.answers.len() == total_questions
    }

    /// Answers in question order; unanswered questions become empty strings.
    pub fn ordered_answers(&self, total_questions: usize) -> Vec<String> {
        (0..total_questions)
            .map(|i| self.answer_for(i).unwrap_or_default().to_string())
            .collect()
    }

    /// Local per-question comparison against the quiz's correct answers.
    pub fn review(&self, questions: &[QuizQuestion]) -> Vec<QuestionReview> {
        questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let user_answer = self.answer_for(index).map(str::to_string);
                let is_correct = user_answer.as_deref().is_some_and(|a| q.is_correct(a));
                QuestionReview {
                    index,
                    question: q.question.clone(),
                    user_answer,
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                    is_correct,
                }
            })
            .collect()
    }

    /// Score of the last graded attempt, rounded for the adaptive quiz request.
    pub fn previous_score(&self) -> Option<u32> {
        self.result
            .as_ref()
            .map(|r| r.score.round().clamp(0.0, 100.0) as u32)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
        self.current_question = 0;
        self.result = None;
    }
}

/// Generated flashcards plus the UI-only flipped flag for each card.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardDeck {
    pub response: FlashcardResponse,
    pub flipped: Vec<bool>,
}

impl FlashcardDeck {
    pub fn new(response: FlashcardResponse) -> Self {
        let flipped = vec![false; response.flashcards.len()];
        Self { response, flipped }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.response.flashcards
    }

    pub fn len(&self) -> usize {
        self.response.flashcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.flashcards.is_empty()
    }

    pub fn is_flipped(&self, index: usize) -> bool {
        self.flipped.get(index).copied().unwrap_or(false)
    }

    /// Toggle a card; returns its new flipped state.
    pub fn flip(&mut self, index: usize) -> Result<bool, WizardError> {
        let total = self.len();
        let flag = self
            .flipped
            .get_mut(index)
            .ok_or(WizardError::CardOutOfRange { index, total })?;
        *flag = !*flag;
        Ok(*flag)
    }
}

/// Single source of truth for the study wizard.
///
/// `WizardState` is owned by [`StateManager`](crate::state::StateManager); the
/// transition methods here are pure and either apply completely or return an
/// error, leaving the state to be discarded by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: WizardStep,
    pub source: Option<SourceDocument>,
    pub options: GenerationOptions,
    pub results: Option<StudyResults>,
    pub quiz_session: QuizSession,
    pub flashcards: Option<FlashcardDeck>,
    pub loading: bool,
    pub error: Option<String>,

    /// Options restored by [`reset`](Self::reset); loaded from configuration.
    pub default_options: GenerationOptions,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::with_defaults(GenerationOptions::default())
    }
}

impl WizardState {
    pub fn with_defaults(default_options: GenerationOptions) -> Self {
        Self {
            step: WizardStep::Upload,
            source: None,
            options: default_options.clone(),
            results: None,
            quiz_session: QuizSession::default(),
            flashcards: None,
            loading: false,
            error: None,
            default_options,
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.as_ref().is_some_and(|s| !s.text.trim().is_empty())
    }

    pub fn summary(&self) -> Option<&SummaryResponse> {
        self.results.as_ref().map(|r| &r.summary)
    }

    pub fn quiz(&self) -> Option<&QuizResponse> {
        self.results.as_ref().map(|r| &r.quiz)
    }

    pub fn question_count(&self) -> usize {
        self.quiz().map(|q| q.questions.len()).unwrap_or(0)
    }

    /// Whether `submit_quiz` would issue a grading request.
    pub fn can_submit_quiz(&self) -> bool {
        self.quiz_session.result.is_none() && self.quiz_session.is_complete(self.question_count())
    }

    pub fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Store pasted text and move on to configuration.
    pub fn accept_pasted_text(&mut self, text: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Upload)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(WizardError::EmptyText);
        }
        self.replace_source(SourceDocument {
            text: trimmed.to_string(),
            origin: SourceOrigin::Pasted,
        });
        self.step = WizardStep::Configure;
        Ok(())
    }

    /// Store text extracted by the backend from an uploaded file.
    pub fn accept_upload(
        &mut self,
        name: String,
        size_bytes: u64,
        text: String,
    ) -> Result<(), WizardError> {
        self.require_step(WizardStep::Upload)?;
        if text.trim().is_empty() {
            return Err(WizardError::NoExtractedText(name));
        }
        self.replace_source(SourceDocument {
            text,
            origin: SourceOrigin::Upload { name, size_bytes },
        });
        self.step = WizardStep::Configure;
        Ok(())
    }

    /// Results, answers and flashcards belong to the text they were generated from.
    fn replace_source(&mut self, source: SourceDocument) {
        let text_changed = self.source.as_ref().is_none_or(|old| old.text != source.text);
        if text_changed {
            self.results = None;
            self.quiz_session.clear();
            self.flashcards = None;
        }
        self.source = Some(source);
    }

    /// Explicit "continue" from the upload step once material is loaded.
    pub fn continue_to_configure(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Upload)?;
        if !self.has_source() {
            return Err(WizardError::NoSource);
        }
        self.step = WizardStep::Configure;
        Ok(())
    }

    /// Store a completed generation round and show the results.
    pub fn accept_results(&mut self, results: StudyResults) {
        self.results = Some(results);
        self.quiz_session.clear();
        self.step = WizardStep::Results;
    }

    /// Swap in a freshly generated quiz, keeping the current summary.
    pub fn replace_quiz(&mut self, quiz: QuizResponse) -> Result<(), WizardError> {
        let results = self.results.as_mut().ok_or(WizardError::NoQuiz)?;
        results.quiz = quiz;
        self.quiz_session.clear();
        Ok(())
    }

    /// Manual back-navigation. Stored results are kept.
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::Upload => WizardStep::Upload,
            WizardStep::Configure => WizardStep::Upload,
            WizardStep::Results => WizardStep::Configure,
        };
    }

    /// Jump to the results step when a generation round is already stored.
    pub fn show_results(&mut self) -> Result<(), WizardError> {
        if self.results.is_none() {
            return Err(WizardError::NoQuiz);
        }
        self.step = WizardStep::Results;
        Ok(())
    }

    pub fn select_answer(&mut self, index: usize, option: &str) -> Result<bool, WizardError> {
        let quiz = self.quiz().ok_or(WizardError::NoQuiz)?;
        let total = quiz.questions.len();
        let question = quiz
            .questions
            .get(index)
            .ok_or(WizardError::QuestionOutOfRange { index, total })?;
        if !question.options.iter().any(|o| o == option) {
            return Err(WizardError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }
        if self.quiz_session.result.is_some() {
            return Err(WizardError::AlreadyGraded);
        }
        Ok(self.quiz_session.select(index, option))
    }

    /// Build the grading payload, or explain why the quiz can't be submitted yet.
    pub fn answer_check_request(
        &self,
    ) -> Result<crate::models::study::AnswerCheckRequest, WizardError> {
        let quiz = self.quiz().ok_or(WizardError::NoQuiz)?;
        let total = quiz.questions.len();
        if self.quiz_session.result.is_some() {
            return Err(WizardError::AlreadyGraded);
        }
        if !self.quiz_session.is_complete(total) {
            return Err(WizardError::QuizIncomplete {
                answered: self.quiz_session.answers.len(),
                total,
            });
        }
        Ok(crate::models::study::AnswerCheckRequest {
            user_answers: self.quiz_session.ordered_answers(total),
            correct_answers: quiz
                .questions
                .iter()
                .map(|q| q.correct_answer.clone())
                .collect(),
        })
    }

    pub fn next_question(&mut self) {
        let last = self.question_count().saturating_sub(1);
        self.quiz_session.current_question = (self.quiz_session.current_question + 1).min(last);
    }

    pub fn previous_question(&mut self) {
        self.quiz_session.current_question = self.quiz_session.current_question.saturating_sub(1);
    }

    pub fn retake_quiz(&mut self) -> Result<(), WizardError> {
        if self.quiz().is_none() {
            return Err(WizardError::NoQuiz);
        }
        self.quiz_session.clear();
        Ok(())
    }

    /// Back to a blank upload step. Options revert to the configured defaults.
    pub fn reset(&mut self) {
        *self = Self::with_defaults(self.default_options.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> QuizResponse {
        let question = |q: &str, answer: &str| QuizQuestion {
            question: q.to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: answer.to_string(),
            explanation: None,
        };
        QuizResponse {
            questions: vec![question("Q1", "A"), question("Q2", "B")],
            total_questions: 2,
            difficulty: "medium".to_string(),
            subject: "General".to_string(),
            estimated_time: 4,
        }
    }

    fn sample_summary() -> SummaryResponse {
        SummaryResponse {
            summary: "- point".to_string(),
            tags: vec![],
            summary_type: "bullet_points".to_string(),
            word_count: 1,
        }
    }

    fn results_state() -> WizardState {
        let mut state = WizardState::default();
        state.accept_pasted_text("Some study text").unwrap();
        state.accept_results(StudyResults {
            summary: sample_summary(),
            quiz: sample_quiz(),
        });
        state
    }

    #[test]
    fn test_initial_state() {
        let state = WizardState::default();
        assert_eq!(state.step, WizardStep::Upload);
        assert!(state.source.is_none());
        assert!(state.results.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_pasted_text_is_trimmed_and_advances() {
        let mut state = WizardState::default();
        state.accept_pasted_text("  photosynthesis  \n").unwrap();

        assert_eq!(state.step, WizardStep::Configure);
        assert_eq!(state.source.as_ref().unwrap().text, "photosynthesis");
    }

    #[test]
    fn test_whitespace_text_rejected() {
        let mut state = WizardState::default();
        let err = state.accept_pasted_text(" \n\t ").unwrap_err();

        assert!(matches!(err, WizardError::EmptyText));
        assert!(err.is_validation());
    }

    #[test]
    fn test_new_material_drops_previous_round() {
        let mut state = results_state();
        state.select_answer(0, "A").unwrap();
        state.flashcards = Some(FlashcardDeck::new(FlashcardResponse {
            flashcards: vec![],
            total_cards: 0,
            subject: "General".to_string(),
            card_type: "mixed".to_string(),
        }));
        state.back();
        state.back();

        state
            .accept_pasted_text("The French Revolution began in 1789")
            .unwrap();

        assert!(state.results.is_none());
        assert!(state.quiz_session.answers.is_empty());
        assert!(state.flashcards.is_none());
        assert!(matches!(state.show_results(), Err(WizardError::NoQuiz)));
        assert_eq!(state.step, WizardStep::Configure);
    }

    #[test]
    fn test_same_material_keeps_previous_round() {
        let mut state = results_state();
        state.back();
        state.back();

        state.accept_pasted_text("  Some study text ").unwrap();

        assert!(state.results.is_some());
        state.show_results().unwrap();
        assert_eq!(state.step, WizardStep::Results);
    }

    #[test]
    fn test_upload_drops_previous_round() {
        let mut state = results_state();
        state.back();
        state.back();

        state
            .accept_upload("history.pdf".to_string(), 2048, "Napoleon".to_string())
            .unwrap();

        assert!(state.results.is_none());
        assert!(state.show_results().is_err());
    }

    #[test]
    fn test_continue_requires_source() {
        let mut state = WizardState::default();
        assert!(matches!(
            state.continue_to_configure(),
            Err(WizardError::NoSource)
        ));

        state.accept_pasted_text("text").unwrap();
        state.back();
        state.continue_to_configure().unwrap();
        assert_eq!(state.step, WizardStep::Configure);
    }

    #[test]
    fn test_back_keeps_results() {
        let mut state = results_state();
        state.back();

        assert_eq!(state.step, WizardStep::Configure);
        assert!(state.summary().is_some());
        assert!(state.quiz().is_some());
    }

    #[test]
    fn test_select_answer_replaces_in_place() {
        let mut state = results_state();
        assert!(state.select_answer(0, "A").unwrap());
        assert!(state.select_answer(1, "C").unwrap());
        assert!(!state.select_answer(0, "A").unwrap());
        assert!(state.select_answer(0, "B").unwrap());

        let answers = &state.quiz_session.answers;
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_index, 0);
        assert_eq!(answers[0].selected_option, "B");
    }

    #[test]
    fn test_select_answer_rejects_bad_input() {
        let mut state = results_state();
        assert!(matches!(
            state.select_answer(5, "A"),
            Err(WizardError::QuestionOutOfRange { index: 5, total: 2 })
        ));
        assert!(matches!(
            state.select_answer(0, "Z"),
            Err(WizardError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_answer_check_request_requires_every_answer() {
        let mut state = results_state();
        state.select_answer(1, "B").unwrap();
        assert!(matches!(
            state.answer_check_request(),
            Err(WizardError::QuizIncomplete { answered: 1, total: 2 })
        ));

        state.select_answer(0, "C").unwrap();
        let request = state.answer_check_request().unwrap();
        assert_eq!(request.user_answers, vec!["C", "B"]);
        assert_eq!(request.correct_answers, vec!["A", "B"]);
    }

    #[test]
    fn test_question_navigation_clamps() {
        let mut state = results_state();
        state.previous_question();
        assert_eq!(state.quiz_session.current_question, 0);
        state.next_question();
        state.next_question();
        assert_eq!(state.quiz_session.current_question, 1);
    }

    #[test]
    fn test_review_marks_correct_answers() {
        let mut state = results_state();
        state.select_answer(0, "A").unwrap();
        state.select_answer(1, "C").unwrap();

        let review = state.quiz_session.review(&state.quiz().unwrap().questions);
        assert!(review[0].is_correct);
        assert!(!review[1].is_correct);
        assert_eq!(review[1].correct_answer, "B");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut custom = GenerationOptions::default();
        custom.subject = "Biology".to_string();
        let mut state = WizardState::with_defaults(custom.clone());
        state.accept_pasted_text("text").unwrap();
        state.options.num_questions = 12;
        state.error = Some("boom".to_string());

        state.reset();

        assert_eq!(state, WizardState::with_defaults(custom));
    }

    #[test]
    fn test_flashcard_flip_toggles() {
        let mut deck = FlashcardDeck::new(FlashcardResponse {
            flashcards: vec![Flashcard {
                front: "ATP".to_string(),
                back: "Energy currency".to_string(),
                category: None,
            }],
            total_cards: 1,
            subject: "Biology".to_string(),
            card_type: "definition".to_string(),
        });

        assert!(deck.flip(0).unwrap());
        assert!(deck.is_flipped(0));
        assert!(!deck.flip(0).unwrap());
        assert!(matches!(
            deck.flip(3),
            Err(WizardError::CardOutOfRange { index: 3, total: 1 })
        ));
    }
}
