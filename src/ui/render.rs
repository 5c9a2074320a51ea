// Terminal formatting for wizard content
//
// Pure functions from state to styled strings. Styling comes from `console`,
// which drops the escape codes automatically when stdout is not a terminal.

use crate::models::{
    Flashcard, GenerationOptions, QuestionReview, QuizQuestion, QuizResult, SourceDocument,
    SourceOrigin, WizardStep,
};
use crate::services::summary::{RichText, Span, SummaryBlock};
use console::style;
use std::fmt::Write;

/// Inline text with bold spans emphasised.
pub fn format_rich(text: &RichText) -> String {
    text.spans
        .iter()
        .map(|span| match span {
            Span::Text(s) => s.clone(),
            Span::Bold(s) => style(s).bold().to_string(),
        })
        .collect()
}

/// Summary blocks as indented terminal text, one blank line between blocks.
pub fn format_summary(blocks: &[SummaryBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        if !out.is_empty() {
            out.push('\n');
        }
        match block {
            SummaryBlock::Heading { level, text } => {
                let heading = format_rich(text);
                let heading = if *level <= 2 {
                    style(heading).cyan().bold().to_string()
                } else {
                    style(heading).bold().to_string()
                };
                let _ = writeln!(out, "  {}", heading);
            }
            SummaryBlock::Paragraph(text) => {
                let _ = writeln!(out, "  {}", format_rich(text));
            }
            SummaryBlock::BulletList(items) => {
                for item in items {
                    let _ = writeln!(out, "  {} {}", style("•").cyan(), format_rich(item));
                }
            }
            SummaryBlock::NumberedList(items) => {
                for (i, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "  {} {}", style(format!("{}.", i + 1)).cyan(), format_rich(item));
                }
            }
        }
    }
    out
}

/// Progress marker for the step header, e.g. `[2/3] Configure`.
pub fn format_step(step: WizardStep) -> String {
    let (number, title) = match step {
        WizardStep::Upload => (1, "Upload study material"),
        WizardStep::Configure => (2, "Configure generation"),
        WizardStep::Results => (3, "Study results"),
    };
    format!(
        "{} {}",
        style(format!("[{}/3]", number)).dim(),
        style(title).bold()
    )
}

pub fn format_source(source: &SourceDocument) -> String {
    let detail = match &source.origin {
        SourceOrigin::Upload { size_bytes, .. } => {
            format!("{:.1} KB, {} words", *size_bytes as f64 / 1024.0, source.word_count())
        }
        SourceOrigin::Pasted => {
            format!("{} characters, {} words", source.char_count(), source.word_count())
        }
    };
    format!(
        "{} {} ({})",
        style("✓").green(),
        style(source.display_name()).cyan(),
        detail
    )
}

pub fn format_options(options: &GenerationOptions) -> String {
    format!(
        "  Subject: {}\n  Questions: {}  Difficulty: {}\n  Summary: {}\n  Flashcards: {} ({})",
        style(&options.subject).cyan(),
        options.num_questions,
        options.difficulty,
        options.summary_type.label(),
        options.num_cards,
        options.card_type
    )
}

/// One quiz question with its options; the recorded answer is marked.
pub fn format_question(
    index: usize,
    total: usize,
    question: &QuizQuestion,
    selected: Option<&str>,
) -> String {
    let mut out = format!(
        "{} {}\n",
        style(format!("Question {} of {}", index + 1, total)).dim(),
        style(&question.question).bold()
    );
    for (i, option) in question.options.iter().enumerate() {
        let letter = (b'A' + (i % 26) as u8) as char;
        if selected == Some(option.as_str()) {
            let _ = writeln!(out, "  {} {}. {}", style("●").green(), letter, style(option).green());
        } else {
            let _ = writeln!(out, "  ○ {}. {}", letter, option);
        }
    }
    out
}

pub fn format_result(result: &QuizResult) -> String {
    let verdict = if result.passed {
        style("PASSED").green().bold()
    } else {
        style("NOT PASSED").red().bold()
    };
    let mut out = format!(
        "{} {:.0}% ({}/{} correct)\n  {}",
        verdict, result.score, result.correct_answers, result.total_questions, result.feedback
    );
    if !result.suggestion.is_empty() {
        let _ = write!(out, "\n  {}", style(&result.suggestion).dim());
    }
    out
}

/// Per-question review shown after grading.
pub fn format_review(reviews: &[QuestionReview]) -> String {
    let mut out = String::new();
    for review in reviews {
        let mark = if review.is_correct {
            style("✓").green()
        } else {
            style("✗").red()
        };
        let _ = writeln!(out, "  {} {}. {}", mark, review.index + 1, review.question);
        let answer = review.user_answer.as_deref().unwrap_or("(no answer)");
        let _ = writeln!(out, "      Your answer: {}", answer);
        if !review.is_correct {
            let _ = writeln!(out, "      Correct answer: {}", style(&review.correct_answer).green());
        }
        if let Some(explanation) = review.explanation.as_deref().filter(|e| !e.is_empty()) {
            let _ = writeln!(out, "      {}", style(explanation).dim());
        }
    }
    out
}

/// A flashcard showing its front, or its back once flipped.
pub fn format_flashcard(index: usize, total: usize, card: &Flashcard, flipped: bool) -> String {
    let category = card
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default();
    let (side, text) = if flipped {
        ("Back", style(&card.back).green().to_string())
    } else {
        ("Front", style(&card.front).bold().to_string())
    };
    format!(
        "{}{}\n  {}: {}",
        style(format!("Card {} of {}", index + 1, total)).dim(),
        category,
        side,
        text
    )
}
