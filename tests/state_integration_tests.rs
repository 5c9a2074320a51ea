//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on wizard transitions
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple threads
//! - Leaves state untouched when a transition fails

use quizforge::models::{QuizQuestion, QuizResponse, StudyResults, SummaryResponse};
use quizforge::{StateChange, StateManager, WizardError, WizardState, WizardStep};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

fn results(questions: usize) -> StudyResults {
    StudyResults {
        summary: SummaryResponse {
            summary: "Short summary".to_string(),
            tags: vec![],
            summary_type: "short".to_string(),
            word_count: 2,
        },
        quiz: QuizResponse {
            questions: (0..questions)
                .map(|i| QuizQuestion {
                    question: format!("Question {}", i),
                    options: vec!["A".to_string(), "B".to_string()],
                    correct_answer: "A".to_string(),
                    explanation: None,
                })
                .collect(),
            total_questions: questions,
            difficulty: "medium".to_string(),
            subject: "General".to_string(),
            estimated_time: 2,
        },
    }
}

fn manager_at_results(questions: usize) -> StateManager {
    let manager = StateManager::new();
    manager
        .try_update(|s| {
            s.accept_pasted_text("Mitochondria make ATP")?;
            s.accept_results(results(questions));
            Ok(())
        })
        .unwrap();
    manager
}

#[tokio::test]
async fn test_state_change_events_emitted() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state
        .try_update(|s| s.accept_pasted_text("Mitochondria make ATP"))
        .unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert!(
        matches!(event, StateChange::SourceLoaded { word_count: 3, .. }),
        "Expected SourceLoaded event, got: {:?}",
        event
    );

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(
        event,
        StateChange::StepChanged {
            from: WizardStep::Upload,
            to: WizardStep::Configure
        }
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.begin_request();

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
        assert_eq!(event, StateChange::LoadingChanged { loading: true });
    }
}

#[tokio::test]
async fn test_results_and_answers_events() {
    let state = StateManager::new();
    state
        .try_update(|s| s.accept_pasted_text("Mitochondria make ATP"))
        .unwrap();
    let mut rx = state.subscribe();

    state.update(|s| s.accept_results(results(3)));
    let changes: Vec<StateChange> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(changes.contains(&StateChange::ResultsReady { questions: 3 }));
    assert!(changes.contains(&StateChange::StepChanged {
        from: WizardStep::Configure,
        to: WizardStep::Results
    }));

    let (_, changes) = state.try_update(|s| s.select_answer(1, "B")).unwrap();
    assert_eq!(
        changes,
        vec![StateChange::AnswersChanged {
            answered: 1,
            total: 3
        }]
    );

    // Same answer again: nothing changes, nothing is emitted
    let (changed, changes) = state.try_update(|s| s.select_answer(1, "B")).unwrap();
    assert!(!changed);
    assert!(changes.is_empty());
}

#[test]
fn test_failed_transition_emits_nothing() {
    let state = manager_at_results(2);
    let before = state.snapshot();
    let mut rx = state.subscribe();

    let result = state.try_update(|s| s.select_answer(7, "A"));

    assert!(matches!(
        result,
        Err(WizardError::QuestionOutOfRange { index: 7, total: 2 })
    ));
    assert_eq!(state.snapshot(), before);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_reset_from_every_step_yields_initial_state() {
    let upload = StateManager::new();
    let configure = StateManager::new();
    configure
        .try_update(|s| s.accept_pasted_text("text"))
        .unwrap();
    let answered = manager_at_results(2);
    answered.try_update(|s| s.select_answer(0, "A")).unwrap();
    answered.set_error("Failed to check answers: timeout");

    for manager in [upload, configure, answered] {
        manager.reset();
        assert_eq!(manager.snapshot(), WizardState::default());
    }
}

#[test]
fn test_concurrent_answer_selection() {
    let state = Arc::new(manager_at_results(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for option in ["A", "B", "A"] {
                    state.try_update(|s| s.select_answer(i, option)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.quiz_session.answers.len(), 8);
    assert!(snapshot.can_submit_quiz());
    let request = snapshot.answer_check_request().unwrap();
    assert!(request.user_answers.iter().all(|a| a == "A"));
}

#[test]
fn test_back_and_forward_keep_results() {
    let state = manager_at_results(2);

    state.update(|s| s.back());
    assert_eq!(state.read(|s| s.step), WizardStep::Configure);
    assert!(state.read(|s| s.results.is_some()));

    state.try_update(|s| s.show_results()).unwrap();
    assert_eq!(state.read(|s| s.step), WizardStep::Results);
}
