// UI module - Wizard controller and terminal front end
//
// This module contains:
// - WizardController: Drives the wizard state machine and the backend calls
// - TerminalApp: Interactive dialoguer loop that renders each wizard step
// - render: console-styled formatting for summaries, quizzes and flashcards

pub mod controller;
pub mod render;
pub mod terminal;

pub use controller::WizardController;
pub use terminal::{SAMPLE_TEXT, TerminalApp};
