//! Wire shapes of the generation and grading API.

use serde::{Deserialize, Serialize};

use crate::models::domain::{
    grade::{deserialize_flag, GradeResult},
    question::{CorrectAnswer, Question, QuestionKind},
};

/// The `examSetting` part of an upload. Field names are what the generation
/// service reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSetting {
    #[serde(rename = "multipleChoice")]
    pub multiple_choice: u32,
    #[serde(rename = "shortAnswer")]
    pub short_answer: u32,
    pub essay: u32,
    #[serde(rename = "examNumber")]
    pub exam_number: u32,
    pub custom_prompt: String,
    pub custom_image_prompt: String,
    #[serde(rename = "isTextCentered")]
    pub is_text_centered: bool,
    #[serde(rename = "isLectureOnly")]
    pub is_lecture_only: bool,
}

impl Default for ExamSetting {
    fn default() -> Self {
        Self {
            multiple_choice: 20,
            short_answer: 0,
            essay: 0,
            exam_number: 2,
            custom_prompt: String::new(),
            custom_image_prompt: String::new(),
            is_text_centered: false,
            is_lecture_only: false,
        }
    }
}

impl ExamSetting {
    /// The generation service treats a zero multiple-choice or short-answer
    /// count as "use the default of 2".
    pub fn normalized(mut self) -> Self {
        if self.multiple_choice == 0 {
            self.multiple_choice = 2;
        }
        if self.short_answer == 0 {
            self.short_answer = 2;
        }
        self
    }
}

/// A question as returned by the generation service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedQuestion {
    pub case: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    pub correct_answer: CorrectAnswer,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

impl GeneratedQuestion {
    pub fn into_question(self, id: u32) -> Question {
        let choices = match self.case {
            QuestionKind::Choice => self.choices.unwrap_or_default(),
            QuestionKind::FreeText => Vec::new(),
        };

        Question {
            id,
            kind: self.case,
            prompt: self.question,
            choices,
            correct_answer: self.correct_answer,
            explanation: self.explanation.unwrap_or_default(),
            intent: self.intent.unwrap_or_default(),
        }
    }
}

/// Assigns ids by position in the generation response.
pub fn into_questions(generated: Vec<GeneratedQuestion>) -> Vec<Question> {
    generated
        .into_iter()
        .enumerate()
        .map(|(index, g)| g.into_question(index as u32))
        .collect()
}

/// The user's answer as the grading service expects it: the choice number
/// for choice questions, verbatim text otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Ordinal(u32),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingItem {
    pub index: u32,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: CorrectAnswer,
    pub user_answer: SubmittedAnswer,
    pub explanation: String,
    pub intent: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingRequest {
    #[serde(rename = "FeedBackResults")]
    pub results: Vec<GradingItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponseItem {
    pub index: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl From<GradeResponseItem> for GradeResult {
    fn from(item: GradeResponseItem) -> Self {
        GradeResult::new(item.index, item.is_correct, item.feedback)
    }
}
