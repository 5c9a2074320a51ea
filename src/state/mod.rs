// State management module
//
// This module provides the StateManager which wraps WizardState with thread-safe access
// using Arc<RwLock<T>> and emits change events for UI updates.

use crate::models::{AppConfig, GenerationOptions, WizardError, WizardState, WizardStep};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events let the front end (and the log) react to state changes without
/// polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The wizard moved to another step
    StepChanged { from: WizardStep, to: WizardStep },

    /// A request started or finished
    LoadingChanged { loading: bool },

    /// The banner error was set or dismissed
    ErrorChanged { error: Option<String> },

    /// New study material was loaded
    SourceLoaded { name: String, word_count: usize },

    /// Generation options were edited
    OptionsChanged,

    /// A summary and quiz were stored
    ResultsReady { questions: usize },

    /// Recorded answers changed
    AnswersChanged { answered: usize, total: usize },

    /// The backend graded the quiz
    QuizGraded { score: f64, passed: bool },

    /// A flashcard deck was stored or cleared
    FlashcardsChanged { total: usize },

    /// A single card was turned over
    CardFlipped { index: usize, flipped: bool },

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// This is the single owner of [`WizardState`]:
/// - [`read()`](Self::read) for reading state under a short lock
/// - [`update()`](Self::update) / [`try_update()`](Self::try_update) for mutations with
///   automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::models::WizardState`]: The underlying state structure
/// - [`StateChange`]: Event types emitted on state mutations
/// - [`crate::ui::WizardController`]: Drives transitions and backend calls
pub struct StateManager {
    /// The wizard state protected by RwLock for thread-safe access
    state: Arc<RwLock<WizardState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new() -> Self {
        Self::with_state(WizardState::default())
    }

    pub fn with_state(state: WizardState) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(state)),
            state_tx,
        }
    }

    /// Get a cloned snapshot of the current state
    pub fn snapshot(&self) -> WizardState {
        self.state.read().expect("wizard state lock poisoned").clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let step = state_manager.read(|state| state.step);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&WizardState) -> R,
    {
        let state = self.state.read().expect("wizard state lock poisoned");
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Returns the events that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut WizardState),
    {
        let mut state = self.state.write().expect("wizard state lock poisoned");
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        self.emit(&changes);
        changes
    }

    /// Apply a fallible transition atomically
    ///
    /// The transition runs against a copy; on error the stored state is left
    /// untouched and no events are emitted.
    pub fn try_update<F, T>(&self, transition: F) -> Result<(T, Vec<StateChange>), WizardError>
    where
        F: FnOnce(&mut WizardState) -> Result<T, WizardError>,
    {
        let mut state = self.state.write().expect("wizard state lock poisoned");
        let mut candidate = state.clone();

        let value = transition(&mut candidate)?;

        let changes = Self::detect_changes(&state, &candidate);
        *state = candidate;
        drop(state);

        self.emit(&changes);
        Ok((value, changes))
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, changes: &[StateChange]) {
        for change in changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(old: &WizardState, new: &WizardState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.source != new.source {
            if let Some(source) = &new.source {
                changes.push(StateChange::SourceLoaded {
                    name: source.display_name().to_string(),
                    word_count: source.word_count(),
                });
            }
        }

        if old.step != new.step {
            changes.push(StateChange::StepChanged {
                from: old.step,
                to: new.step,
            });
        }

        if old.options != new.options {
            changes.push(StateChange::OptionsChanged);
        }

        if old.results != new.results {
            if let Some(results) = &new.results {
                changes.push(StateChange::ResultsReady {
                    questions: results.quiz.questions.len(),
                });
            }
        }

        if old.quiz_session.answers != new.quiz_session.answers {
            changes.push(StateChange::AnswersChanged {
                answered: new.quiz_session.answers.len(),
                total: new.question_count(),
            });
        }

        if old.quiz_session.result != new.quiz_session.result {
            if let Some(result) = &new.quiz_session.result {
                changes.push(StateChange::QuizGraded {
                    score: result.score,
                    passed: result.passed,
                });
            }
        }

        match (&old.flashcards, &new.flashcards) {
            (Some(before), Some(after)) if before.response == after.response => {
                for (index, (was, is)) in before.flipped.iter().zip(&after.flipped).enumerate() {
                    if was != is {
                        changes.push(StateChange::CardFlipped {
                            index,
                            flipped: *is,
                        });
                    }
                }
            }
            (before, after) if before != after => {
                changes.push(StateChange::FlashcardsChanged {
                    total: after.as_ref().map(|d| d.len()).unwrap_or(0),
                });
            }
            _ => {}
        }

        if old.loading != new.loading {
            changes.push(StateChange::LoadingChanged {
                loading: new.loading,
            });
        }

        if old.error != new.error {
            changes.push(StateChange::ErrorChanged {
                error: new.error.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Mark a request as started: loading on, previous error cleared
    pub fn begin_request(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.loading = true;
            state.error = None;
        })
    }

    /// Mark a request as finished without changing anything else
    pub fn end_request(&self) -> Vec<StateChange> {
        self.update(|state| state.loading = false)
    }

    /// Show an error banner and stop any loading indicator
    pub fn set_error(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.loading = false;
            state.error = Some(message);
        })
    }

    /// Dismiss the error banner
    pub fn clear_error(&self) -> Vec<StateChange> {
        self.update(|state| state.error = None)
    }

    /// Edit generation options; invalid edits are rejected as a whole
    pub fn update_options<F>(&self, edit: F) -> Result<Vec<StateChange>, WizardError>
    where
        F: FnOnce(&mut GenerationOptions),
    {
        self.try_update(|state| {
            edit(&mut state.options);
            state.options.validate().map_err(WizardError::InvalidOptions)
        })
        .map(|(_, changes)| changes)
    }

    /// Reset the wizard to a blank upload step
    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| state.reset());

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Load default generation options from the application configuration
    pub fn load_from_config(&self, config: &AppConfig) -> Vec<StateChange> {
        self.update(|state| {
            state.default_options = config.defaults.clone();
            state.options = config.defaults.clone();

            tracing::info!(
                "Loaded defaults: questions={}, cards={}, subject={}, difficulty={}, summary={}",
                state.options.num_questions,
                state.options.num_cards,
                state.options.subject,
                state.options.difficulty,
                state.options.summary_type
            );
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
