use std::fmt;

use serde::{Deserialize, Serialize};

/// The two question kinds the generation service produces. On the wire they
/// are the integers `0` (choice) and `1` (free text).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuestionKind {
    Choice,
    FreeText,
}

impl TryFrom<u8> for QuestionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QuestionKind::Choice),
            1 => Ok(QuestionKind::FreeText),
            other => Err(format!("unknown question kind {}", other)),
        }
    }
}

impl From<QuestionKind> for u8 {
    fn from(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Choice => 0,
            QuestionKind::FreeText => 1,
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Choice => write!(f, "choice"),
            QuestionKind::FreeText => write!(f, "free_text"),
        }
    }
}

/// Either the number of the correct choice or a model answer for free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Ordinal(u32),
    Text(String),
}

impl fmt::Display for CorrectAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectAnswer::Ordinal(n) => write!(f, "{}", n),
            CorrectAnswer::Text(text) => write!(f, "{}", text),
        }
    }
}

/// A generated question. Never mutated once it has been loaded into a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub correct_answer: CorrectAnswer,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub intent: String,
}

impl Question {
    pub fn is_choice(&self) -> bool {
        self.kind == QuestionKind::Choice
    }

    pub fn choice_label(&self, position: usize) -> Option<&str> {
        self.choices.get(position).map(String::as_str)
    }
}

/// A user's answer, keyed elsewhere by question id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Zero-based position in the question's `choices`.
    Choice(usize),
    Text(String),
}

impl Answer {
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Choice(_) => false,
            Answer::Text(text) => text.trim().is_empty(),
        }
    }

    /// Renders the answer the way the user saw it.
    pub fn display_for(&self, question: &Question) -> String {
        match self {
            Answer::Choice(position) => question
                .choice_label(*position)
                .map(str::to_string)
                .unwrap_or_else(|| (position + 1).to_string()),
            Answer::Text(text) => text.clone(),
        }
    }
}
