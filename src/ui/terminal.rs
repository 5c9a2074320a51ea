// Terminal front end - Interactive wizard loop
//
// Renders the current wizard step, turns menu choices into controller calls and
// blocks on the async ones through the tokio runtime handle. All state lives in
// the StateManager; this module only reads snapshots and prints them.

use crate::models::{CardType, Difficulty, SummaryType, WizardState, WizardStep};
use crate::services::validation::clean_input_path;
use crate::ui::controller::WizardController;
use crate::ui::render;
use anyhow::Result;
use camino::Utf8Path;
use console::{Term, style};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Sample material offered on the upload step.
pub const SAMPLE_TEXT: &str = "Photosynthesis is the process by which plants, algae, and some bacteria convert light energy, usually from the sun, into chemical energy stored in glucose. This process occurs in two main stages: the light-dependent reactions and the Calvin cycle. The light-dependent reactions take place in the thylakoid membranes of chloroplasts. During this stage, chlorophyll absorbs light energy, which excites electrons. These high-energy electrons are passed through an electron transport chain, ultimately producing ATP and NADPH. Oxygen is released as a byproduct when water molecules are split. The Calvin cycle occurs in the stroma of chloroplasts. In this stage, carbon dioxide from the atmosphere is fixed into organic molecules using the ATP and NADPH produced in the light-dependent reactions. The key enzyme in this process is RuBisCO.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive terminal session over a [`WizardController`].
///
/// Must be driven from a thread outside the tokio runtime; async controller
/// calls are run with [`tokio::runtime::Handle::block_on`].
pub struct TerminalApp {
    controller: WizardController,
    handle: tokio::runtime::Handle,
    theme: ColorfulTheme,
    term: Term,
}

impl TerminalApp {
    pub fn new(controller: WizardController, handle: tokio::runtime::Handle) -> Self {
        Self {
            controller,
            handle,
            theme: ColorfulTheme::default(),
            term: Term::stdout(),
        }
    }

    /// Run the wizard until the user quits.
    pub fn run(&self) -> Result<()> {
        self.print_banner();

        loop {
            self.show_error_banner();

            let state = self.controller.snapshot();
            println!();
            println!("  {}", render::format_step(state.step));
            println!();

            let flow = match state.step {
                WizardStep::Upload => self.upload_step(&state)?,
                WizardStep::Configure => self.configure_step(&state)?,
                WizardStep::Results => self.results_step(&state)?,
            };

            if flow == Flow::Quit {
                tracing::info!("User quit the wizard");
                return Ok(());
            }
        }
    }

    /// Upload a file before the interactive loop starts.
    pub fn load_file(&self, path: &Utf8Path) {
        let _ = self.with_spinner(
            &format!("Uploading {}...", path),
            self.controller.upload_path(path),
        );
    }

    /// Use text passed on the command line before the interactive loop starts.
    pub fn load_text(&self, text: &str) {
        let _ = self.controller.submit_pasted_text(text);
    }

    /// Print the backend health and return whether it answered.
    pub fn check_backend(&self) -> bool {
        match self.with_spinner("Checking backend...", self.controller.health_check()) {
            Ok(status) => {
                println!(
                    "  {} {} is {}",
                    style("✓").green(),
                    style(&status.service).cyan(),
                    status.status
                );
                true
            }
            Err(_) => {
                self.show_error_banner();
                false
            }
        }
    }

    fn print_banner(&self) {
        let _ = self.term.clear_screen();
        println!();
        println!("  {}", style("QuizForge").cyan().bold());
        println!(
            "  {}",
            style("Summaries, quizzes and flashcards from your study material").dim()
        );
    }

    /// Print the pending error once, then dismiss it.
    fn show_error_banner(&self) {
        if let Some(error) = self.controller.snapshot().error {
            println!();
            println!("  {} {}", style("✗").red().bold(), style(error).red());
            self.controller.dismiss_error();
        }
    }

    fn with_spinner<F: Future>(&self, message: &str, future: F) -> F::Output {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        let output = self.handle.block_on(future);

        spinner.finish_and_clear();
        output
    }

    fn choose(&self, prompt: &str, items: &[String]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    fn upload_step(&self, state: &WizardState) -> Result<Flow> {
        if let Some(source) = &state.source {
            println!("  Loaded: {}", render::format_source(source));
        }

        let mut items = vec![
            "Upload a PDF".to_string(),
            "Paste text".to_string(),
            "Use sample text (photosynthesis)".to_string(),
        ];
        if state.has_source() {
            items.push("Continue with loaded material".to_string());
        }
        items.push("Check backend".to_string());
        items.push("Quit".to_string());

        let choice = items[self.choose("What would you like to study?", &items)?].clone();
        match choice.as_str() {
            "Upload a PDF" => {
                let raw: String = Input::with_theme(&self.theme)
                    .with_prompt("  Path to PDF")
                    .interact_text()?;
                let path = clean_input_path(&raw);
                self.load_file(&path);
            }
            "Paste text" => {
                let text = self.read_pasted_text()?;
                self.load_text(&text);
            }
            "Use sample text (photosynthesis)" => self.load_text(SAMPLE_TEXT),
            "Continue with loaded material" => {
                let _ = self.controller.continue_to_configure();
            }
            "Check backend" => {
                self.check_backend();
            }
            _ => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn read_pasted_text(&self) -> Result<String> {
        println!(
            "  {}",
            style("Paste or type your material. Finish with an empty line.").dim()
        );
        let mut lines = Vec::new();
        loop {
            let line = self.term.read_line()?;
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    // -----------------------------------------------------------------------
    // Configure
    // -----------------------------------------------------------------------

    fn configure_step(&self, state: &WizardState) -> Result<Flow> {
        if let Some(source) = &state.source {
            println!("  {}", render::format_source(source));
        }
        println!("{}", render::format_options(&state.options));
        println!();

        let options = &state.options;
        let mut items = vec![
            "Generate summary & quiz".to_string(),
            format!("Subject: {}", options.subject),
            format!("Questions: {}", options.num_questions),
            format!("Difficulty: {}", options.difficulty),
            format!("Summary type: {}", options.summary_type.label()),
            format!("Flashcards: {}", options.num_cards),
            format!("Card type: {}", options.card_type),
        ];
        if state.results.is_some() {
            items.push("View previous results".to_string());
        }
        items.push("Back".to_string());
        items.push("Start over".to_string());
        items.push("Quit".to_string());

        let index = self.choose("Configure", &items)?;
        match index {
            0 => {
                let _ = self.with_spinner(
                    "Generating summary and quiz...",
                    self.controller.generate(),
                );
            }
            1 => {
                let subject: String = Input::with_theme(&self.theme)
                    .with_prompt("  Subject")
                    .default(options.subject.clone())
                    .interact_text()?;
                let _ = self.controller.update_options(|o| o.subject = subject);
            }
            2 => {
                let count = self.prompt_count("  Number of questions", options.num_questions)?;
                let _ = self.controller.update_options(|o| o.num_questions = count);
            }
            3 => {
                let labels: Vec<String> = Difficulty::ALL.iter().map(|d| d.to_string()).collect();
                let pick = self.choose("Difficulty", &labels)?;
                let _ = self
                    .controller
                    .update_options(|o| o.difficulty = Difficulty::ALL[pick]);
            }
            4 => {
                let labels: Vec<String> = SummaryType::ALL
                    .iter()
                    .map(|t| t.label().to_string())
                    .collect();
                let pick = self.choose("Summary type", &labels)?;
                let _ = self
                    .controller
                    .update_options(|o| o.summary_type = SummaryType::ALL[pick]);
            }
            5 => {
                let count = self.prompt_count("  Number of flashcards", options.num_cards)?;
                let _ = self.controller.update_options(|o| o.num_cards = count);
            }
            6 => {
                let labels: Vec<String> = CardType::ALL.iter().map(|c| c.to_string()).collect();
                let pick = self.choose("Card type", &labels)?;
                let _ = self
                    .controller
                    .update_options(|o| o.card_type = CardType::ALL[pick]);
            }
            _ => match items[index].as_str() {
                "View previous results" => {
                    let _ = self.controller.show_results();
                }
                "Back" => self.controller.back(),
                "Start over" => self.controller.reset(),
                _ => return Ok(Flow::Quit),
            },
        }
        Ok(Flow::Continue)
    }

    fn prompt_count(&self, prompt: &str, current: u32) -> Result<u32> {
        Ok(Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(current)
            .validate_with(|value: &u32| -> Result<(), &str> {
                if *value == 0 {
                    Err("Must be at least 1")
                } else {
                    Ok(())
                }
            })
            .interact_text()?)
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    fn results_step(&self, state: &WizardState) -> Result<Flow> {
        let graded = state.quiz_session.result.is_some();
        let mut items = vec!["Read summary".to_string()];
        items.push(if graded {
            "Review quiz results".to_string()
        } else {
            format!(
                "Take quiz ({}/{} answered)",
                state.quiz_session.answers.len(),
                state.question_count()
            )
        });
        if graded {
            items.push("Retake quiz".to_string());
        }
        items.push("New quiz (adapted to last score)".to_string());
        items.push(if state.flashcards.is_some() {
            "Flashcards".to_string()
        } else {
            "Generate flashcards".to_string()
        });
        items.push("Back to configure".to_string());
        items.push("Start over".to_string());
        items.push("Quit".to_string());

        let choice = items[self.choose("Results", &items)?].clone();
        match choice.as_str() {
            "Read summary" => self.show_summary(state),
            "Review quiz results" => self.show_quiz_result(state),
            "Retake quiz" => {
                let _ = self.controller.retake_quiz();
            }
            "New quiz (adapted to last score)" => {
                let _ = self.with_spinner(
                    "Generating a new quiz...",
                    self.controller.regenerate_quiz(),
                );
            }
            "Flashcards" => self.browse_flashcards()?,
            "Generate flashcards" => {
                let generated = self.with_spinner(
                    "Generating flashcards...",
                    self.controller.generate_flashcards(),
                );
                if generated.is_ok() {
                    self.browse_flashcards()?;
                }
            }
            "Back to configure" => self.controller.back(),
            "Start over" => {
                let confirmed = Confirm::with_theme(&self.theme)
                    .with_prompt("  Discard this material and start over?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    self.controller.reset();
                }
            }
            "Quit" => return Ok(Flow::Quit),
            _ => self.take_quiz()?,
        }
        Ok(Flow::Continue)
    }

    fn show_summary(&self, state: &WizardState) {
        let Some(summary) = state.summary() else {
            return;
        };
        println!();
        if let Some(blocks) = self.controller.rendered_summary() {
            print!("{}", render::format_summary(&blocks));
        }
        println!();
        let mut footer = format!("{} words", summary.word_count);
        if !summary.tags.is_empty() {
            footer.push_str(&format!(" · {}", summary.tags.join(", ")));
        }
        println!("  {}", style(footer).dim());
    }

    fn show_quiz_result(&self, state: &WizardState) {
        let (Some(result), Some(quiz)) = (&state.quiz_session.result, state.quiz()) else {
            return;
        };
        println!();
        println!("  {}", render::format_result(result));
        println!();
        print!(
            "{}",
            render::format_review(&state.quiz_session.review(&quiz.questions))
        );
    }

    /// One question at a time; picking an option records it and moves on.
    fn take_quiz(&self) -> Result<()> {
        loop {
            let state = self.controller.snapshot();
            let Some(quiz) = state.quiz() else {
                return Ok(());
            };
            let total = quiz.questions.len();
            let index = state.quiz_session.current_question;
            let Some(question) = quiz.questions.get(index) else {
                return Ok(());
            };

            println!();
            print!(
                "{}",
                render::format_question(index, total, question, state.quiz_session.answer_for(index))
            );

            let mut items = question.options.clone();
            let option_count = items.len();
            if index > 0 {
                items.push("← Previous".to_string());
            }
            if index + 1 < total {
                items.push("Next →".to_string());
            }
            if state.can_submit_quiz() {
                items.push("Submit answers".to_string());
            }
            items.push("Leave quiz".to_string());

            let pick = self.choose("Your answer", &items)?;
            if pick < option_count {
                if self.controller.select_answer(index, &items[pick]).is_ok() {
                    self.controller.next_question();
                }
                continue;
            }

            match items[pick].as_str() {
                "← Previous" => self.controller.previous_question(),
                "Next →" => self.controller.next_question(),
                "Submit answers" => {
                    let graded =
                        self.with_spinner("Checking answers...", self.controller.submit_quiz());
                    match graded {
                        Ok(_) => {
                            self.show_quiz_result(&self.controller.snapshot());
                            return Ok(());
                        }
                        Err(_) => self.show_error_banner(),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn browse_flashcards(&self) -> Result<()> {
        if let Some(deck) = &self.controller.snapshot().flashcards {
            let categories: Vec<String> = deck
                .response
                .by_category()
                .iter()
                .map(|(category, cards)| format!("{} ({})", category, cards.len()))
                .collect();
            println!();
            println!("  {}", style(categories.join(", ")).dim());
        }

        let mut index = 0;
        loop {
            let state = self.controller.snapshot();
            let Some(deck) = &state.flashcards else {
                return Ok(());
            };
            if deck.is_empty() {
                println!("  {}", style("The backend returned no flashcards.").yellow());
                return Ok(());
            }

            let total = deck.len();
            index = index.min(total - 1);
            println!();
            println!(
                "  {}",
                render::format_flashcard(index, total, &deck.cards()[index], deck.is_flipped(index))
            );

            let items = vec![
                "Flip".to_string(),
                "Next card".to_string(),
                "Previous card".to_string(),
                "Discard deck".to_string(),
                "Done".to_string(),
            ];
            match self.choose("Flashcards", &items)? {
                0 => {
                    let _ = self.controller.flip_card(index);
                }
                1 => index = (index + 1) % total,
                2 => index = (index + total - 1) % total,
                3 => {
                    self.controller.clear_flashcards();
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }
}
