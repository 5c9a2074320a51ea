//! Turns backend summary text into structured display blocks.
//!
//! The backend does not reliably return plain text: the summary may arrive as a
//! JSON object with a `content` field, as a JSON fragment embedded in text, or
//! with escaped newlines. [`SummaryRenderer::normalize`] absorbs all of that so
//! the block classification can assume clean text. Nothing here returns an
//! error; malformed input degrades to best-effort paragraphs.

use crate::models::SummaryType;
use regex::Regex;

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

/// Inline text made of literal and bold spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub spans: Vec<Span>,
}

impl RichText {
    /// Text with the bold markup removed.
    pub fn plain(&self) -> String {
        self.spans
            .iter()
            .map(|span| match span {
                Span::Text(s) | Span::Bold(s) => s.as_str(),
            })
            .collect()
    }

    pub fn has_bold(&self) -> bool {
        self.spans.iter().any(|s| matches!(s, Span::Bold(_)))
    }
}

/// One structured display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBlock {
    Heading { level: u8, text: RichText },
    Paragraph(RichText),
    BulletList(Vec<RichText>),
    NumberedList(Vec<RichText>),
}

/// Summary renderer with pre-compiled patterns.
///
/// - `content_field`: a `"content": "..."` pair, honouring escaped quotes
/// - `embedded_content`: a `{"content": "..."` fragment inside otherwise plain text
/// - `leading_wrapper` / `trailing_wrapper`: leftover JSON wrapper when nothing else matched
/// - `bullet_marker` / `number_marker` / `heading_marker`: block markers to strip
/// - `bold`: `**bold**` spans
#[derive(Debug, Clone)]
pub struct SummaryRenderer {
    content_field: Regex,
    embedded_content: Regex,
    leading_wrapper: Regex,
    trailing_wrapper: Regex,
    bullet_marker: Regex,
    number_marker: Regex,
    numbered_start: Regex,
    heading_marker: Regex,
    bold: Regex,
}

impl SummaryRenderer {
    pub fn new() -> Self {
        Self {
            content_field: Regex::new(r#""content":\s*"((?:[^"\\]|\\.)*)""#)
                .expect("Invalid content field regex"),
            embedded_content: Regex::new(r#"\{"content":\s*"([^"]+)""#)
                .expect("Invalid embedded content regex"),
            leading_wrapper: Regex::new(r#"^\s*\{\s*"content":\s*""#)
                .expect("Invalid leading wrapper regex"),
            trailing_wrapper: Regex::new(r#""[^}]*\}\s*$"#).expect("Invalid trailing wrapper regex"),
            bullet_marker: Regex::new(r"^[-•]\s*").expect("Invalid bullet marker regex"),
            number_marker: Regex::new(r"^\d+\.\s*").expect("Invalid number marker regex"),
            numbered_start: Regex::new(r"^\d+\.").expect("Invalid numbered list regex"),
            heading_marker: Regex::new(r"^#+\s*").expect("Invalid heading marker regex"),
            bold: Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"),
        }
    }

    /// Render raw backend text into display blocks.
    pub fn render(&self, raw: &str, summary_type: SummaryType) -> Vec<SummaryBlock> {
        let text = self.normalize(raw);
        match summary_type {
            SummaryType::Detailed => self.render_detailed(&text),
            SummaryType::BulletPoints => self.render_bullet_points(&text),
            SummaryType::Short => self.render_paragraphs(&text),
        }
    }

    /// Reduce whatever the backend sent to plain summary text.
    pub fn normalize(&self, raw: &str) -> String {
        let extracted = self.extract_content(raw);

        let unescaped = extracted
            .replace("\\n", "\n")
            .replace("\\\"", "\"")
            .replace("\r\n", "\n");

        let without_leading = unescaped
            .strip_prefix(['{', '"'])
            .unwrap_or(&unescaped);
        without_leading
            .strip_suffix(['}', '"'])
            .unwrap_or(without_leading)
            .to_string()
    }

    fn extract_content(&self, raw: &str) -> String {
        if !raw.trim_start().starts_with('{') {
            return match self.embedded_content.captures(raw) {
                Some(caps) => caps[1].to_string(),
                None => raw.to_string(),
            };
        }

        match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value) => match value.get("content") {
                Some(serde_json::Value::String(content)) if !content.is_empty() => content.clone(),
                Some(serde_json::Value::Null) | None => raw.to_string(),
                Some(serde_json::Value::String(_)) => raw.to_string(),
                Some(other) => other.to_string(),
            },
            Err(err) => {
                tracing::debug!("Summary looks like JSON but failed to parse: {}", err);
                if let Some(caps) = self.content_field.captures(raw) {
                    caps[1].to_string()
                } else {
                    let stripped = self.leading_wrapper.replace(raw, "");
                    self.trailing_wrapper.replace(&stripped, "").into_owned()
                }
            }
        }
    }

    fn render_detailed(&self, text: &str) -> Vec<SummaryBlock> {
        text.split("\n\n")
            .filter_map(|paragraph| self.classify_paragraph(paragraph.trim()))
            .collect()
    }

    fn classify_paragraph(&self, paragraph: &str) -> Option<SummaryBlock> {
        if paragraph.is_empty() {
            return None;
        }

        if paragraph.starts_with('#') {
            let hashes = paragraph.chars().take_while(|c| *c == '#').count();
            let level = hashes.min(3) as u8;
            let text = self.heading_marker.replace(paragraph, "");
            return Some(SummaryBlock::Heading {
                level,
                text: self.inline(&text),
            });
        }

        if paragraph.contains("- ") || paragraph.contains("• ") {
            return Some(SummaryBlock::BulletList(
                self.list_items(paragraph, &self.bullet_marker),
            ));
        }

        if self.numbered_start.is_match(paragraph) {
            return Some(SummaryBlock::NumberedList(
                self.list_items(paragraph, &self.number_marker),
            ));
        }

        Some(SummaryBlock::Paragraph(self.inline(paragraph)))
    }

    fn list_items(&self, paragraph: &str, marker: &Regex) -> Vec<RichText> {
        paragraph
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| marker.replace(line, "").trim().to_string())
            .filter(|item| !item.is_empty())
            .map(|item| self.inline(&item))
            .collect()
    }

    fn render_bullet_points(&self, text: &str) -> Vec<SummaryBlock> {
        let items: Vec<RichText> = text
            .lines()
            .filter(|line| line.contains("- ") || line.contains("• "))
            .map(|line| self.bullet_marker.replace(line.trim(), "").trim().to_string())
            .filter(|item| !item.is_empty())
            .map(|item| self.inline(&item))
            .collect();

        if items.is_empty() {
            Vec::new()
        } else {
            vec![SummaryBlock::BulletList(items)]
        }
    }

    fn render_paragraphs(&self, text: &str) -> Vec<SummaryBlock> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| SummaryBlock::Paragraph(self.inline(p)))
            .collect()
    }

    /// Split `**bold**` spans out of a line of text.
    pub fn inline(&self, text: &str) -> RichText {
        let mut spans = Vec::new();
        let mut last = 0;

        for caps in self.bold.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                spans.push(Span::Text(text[last..whole.start()].to_string()));
            }
            spans.push(Span::Bold(inner.as_str().to_string()));
            last = whole.end();
        }

        if last < text.len() {
            spans.push(Span::Text(text[last..].to_string()));
        }

        RichText { spans }
    }
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render with a one-off [`SummaryRenderer`].
pub fn render_summary(raw: &str, summary_type: SummaryType) -> Vec<SummaryBlock> {
    SummaryRenderer::new().render(raw, summary_type)
}
