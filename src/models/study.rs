use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Summary layout requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Short,
    BulletPoints,
    Detailed,
}

impl SummaryType {
    pub const ALL: [SummaryType; 3] = [Self::Short, Self::BulletPoints, Self::Detailed];

    /// Wire name used in form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::BulletPoints => "bullet_points",
            Self::Detailed => "detailed",
        }
    }

    /// Human-readable label ("bullet points" rather than "bullet_points").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::BulletPoints => "bullet points",
            Self::Detailed => "detailed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Definition,
    Concept,
    Fact,
    Mixed,
}

impl CardType {
    pub const ALL: [CardType; 4] = [Self::Definition, Self::Concept, Self::Fact, Self::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Concept => "concept",
            Self::Fact => "fact",
            Self::Mixed => "mixed",
        }
    }
}

macro_rules! impl_wire_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| format!("unknown {}: {}", $what, s))
            }
        }
    };
}

impl_wire_enum!(SummaryType, "summary type");
impl_wire_enum!(Difficulty, "difficulty");
impl_wire_enum!(CardType, "card type");

/// User-entered options for the configure step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub num_questions: u32,
    pub num_cards: u32,
    pub subject: String,
    pub difficulty: Difficulty,
    pub summary_type: SummaryType,
    pub card_type: CardType,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            num_questions: 5,
            num_cards: 10,
            subject: "General".to_string(),
            difficulty: Difficulty::Medium,
            summary_type: SummaryType::BulletPoints,
            card_type: CardType::Mixed,
        }
    }
}

impl GenerationOptions {
    /// Returns a description of the first invalid field, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_questions == 0 {
            return Err("Number of questions must be at least 1".to_string());
        }
        if self.num_cards == 0 {
            return Err("Number of flashcards must be at least 1".to_string());
        }
        if self.subject.trim().is_empty() {
            return Err("Subject cannot be empty".to_string());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub text_content: String,
    pub summary_type: SummaryType,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizRequest {
    pub text_content: String,
    pub num_questions: u32,
    pub subject: String,
    pub difficulty: Difficulty,
    pub previous_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardRequest {
    pub text_content: String,
    pub num_cards: u32,
    pub subject: String,
    pub card_type: CardType,
}

/// Answers aligned by position with the quiz questions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCheckRequest {
    pub user_answers: Vec<String>,
    pub correct_answers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Backend responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub text_content: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary_type: String,
    #[serde(default)]
    pub word_count: usize,
}

impl SummaryResponse {
    /// The summary type the backend reports, falling back to the default layout
    /// when it sends something unrecognised.
    pub fn layout(&self) -> SummaryType {
        self.summary_type.parse().unwrap_or(SummaryType::Short)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    /// Case-insensitive, whitespace-trimmed comparison against the correct answer.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
    pub difficulty: String,
    pub subject: String,
    /// Minutes.
    #[serde(default)]
    pub estimated_time: u32,
}

/// Grading outcome returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: f64,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub feedback: String,
    #[serde(default)]
    pub suggestion: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardResponse {
    pub flashcards: Vec<Flashcard>,
    pub total_cards: usize,
    pub subject: String,
    pub card_type: String,
}

impl FlashcardResponse {
    /// Group cards by category, preserving the order categories first appear.
    /// Uncategorised cards are grouped under "General".
    pub fn by_category(&self) -> IndexMap<String, Vec<&Flashcard>> {
        let mut groups: IndexMap<String, Vec<&Flashcard>> = IndexMap::new();
        for card in &self.flashcards {
            let key = card
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("General")
                .to_string();
            groups.entry(key).or_default().push(card);
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        assert_eq!("bullet_points".parse::<SummaryType>(), Ok(SummaryType::BulletPoints));
        assert_eq!("Bullet Points".parse::<SummaryType>(), Ok(SummaryType::BulletPoints));
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(CardType::Mixed.to_string(), "mixed");
    }

    #[test]
    fn test_default_options() {
        let options = GenerationOptions::default();
        assert_eq!(options.num_questions, 5);
        assert_eq!(options.num_cards, 10);
        assert_eq!(options.subject, "General");
        assert_eq!(options.difficulty, Difficulty::Medium);
        assert_eq!(options.summary_type, SummaryType::BulletPoints);
        assert_eq!(options.card_type, CardType::Mixed);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let mut options = GenerationOptions::default();
        options.num_questions = 0;
        assert!(options.validate().is_err());

        let mut options = GenerationOptions::default();
        options.subject = "   ".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_question_correctness_ignores_case_and_whitespace() {
        let question = QuizQuestion {
            question: "Where does the Calvin cycle occur?".to_string(),
            options: vec!["Stroma".to_string(), "Thylakoid".to_string()],
            correct_answer: "Stroma".to_string(),
            explanation: None,
        };

        assert!(question.is_correct("  stroma "));
        assert!(!question.is_correct("Thylakoid"));
    }

    #[test]
    fn test_summary_response_tolerates_missing_fields() {
        let json = r#"{"summary": "text", "summary_type": "detailed"}"#;
        let response: SummaryResponse = serde_json::from_str(json).unwrap();

        assert!(response.tags.is_empty());
        assert_eq!(response.layout(), SummaryType::Detailed);
    }

    #[test]
    fn test_flashcards_grouped_by_category_in_order() {
        let card = |front: &str, category: Option<&str>| Flashcard {
            front: front.to_string(),
            back: "back".to_string(),
            category: category.map(str::to_string),
        };
        let response = FlashcardResponse {
            flashcards: vec![
                card("ATP", Some("Energy")),
                card("Chlorophyll", None),
                card("NADPH", Some("Energy")),
            ],
            total_cards: 3,
            subject: "Biology".to_string(),
            card_type: "mixed".to_string(),
        };

        let groups = response.by_category();
        let keys: Vec<&String> = groups.keys().collect();
        assert_eq!(keys, vec!["Energy", "General"]);
        assert_eq!(groups["Energy"].len(), 2);
    }
}
