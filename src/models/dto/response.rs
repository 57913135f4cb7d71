use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Answer, Correctness, ExamPhase, SessionSnapshot};

pub const APP_TITLE: &str = "Study Mentor";
const FOOTER: &str = "Study Mentor: turn your lecture notes into practice exams.";

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// Header, navigation and footer shared by every page.
#[derive(Debug, Clone, Serialize)]
pub struct ShellView {
    pub title: &'static str,
    pub nav: Vec<NavLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub footer: &'static str,
}

impl ShellView {
    pub fn new(email: Option<&str>) -> Self {
        Self {
            title: APP_TITLE,
            nav: vec![
                NavLink { label: "Upload", href: "/upload" },
                NavLink { label: "Checklist", href: "/checklist" },
            ],
            email: email.map(str::to_string),
            footer: FOOTER,
        }
    }
}

/// A page: the shell plus the page's own content.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub shell: ShellView,
    #[serde(flatten)]
    pub content: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(email: Option<&str>, content: T) -> Self {
        Self {
            shell: ShellView::new(email),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: u32,
    pub number: u32,
    pub kind: String,
    pub prompt: String,
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_choice: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctness: Option<Correctness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamView {
    pub phase: ExamPhase,
    pub can_submit: bool,
    pub read_only: bool,
    pub show_explanations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    pub total: usize,
    pub questions: Vec<QuestionView>,
}

impl From<&SessionSnapshot> for ExamView {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let graded = snapshot.phase == ExamPhase::Graded;
        let reveal = graded && snapshot.show_explanations;

        let questions = snapshot
            .questions()
            .iter()
            .map(|question| {
                let answer = snapshot.answers.get(&question.id);
                let result = snapshot.results.get(&question.id);

                QuestionView {
                    id: question.id,
                    number: question.id + 1,
                    kind: question.kind.to_string(),
                    prompt: question.prompt.clone(),
                    choices: question.choices.clone(),
                    selected_choice: match answer {
                        Some(Answer::Choice(position)) => Some(*position),
                        _ => None,
                    },
                    answer: answer.map(|a| a.display_for(question)),
                    correctness: result.map(|r| r.correctness()),
                    feedback: result.filter(|_| reveal).and_then(|r| r.feedback.clone()),
                    explanation: reveal.then(|| question.explanation.clone()),
                    correct_answer: reveal.then(|| question.correct_answer.to_string()),
                    intent: reveal.then(|| question.intent.clone()),
                }
            })
            .collect();

        ExamView {
            phase: snapshot.phase,
            can_submit: snapshot.can_submit(),
            read_only: snapshot.phase != ExamPhase::Filling,
            show_explanations: snapshot.show_explanations,
            score: snapshot.score,
            total: snapshot.questions().len(),
            questions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub score: u32,
    pub total: usize,
    pub record_id: String,
    pub persisted: bool,
    pub exam: ExamView,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryQuestionView {
    pub number: u32,
    pub prompt: String,
    pub choices: Vec<String>,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctness: Option<Correctness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryView {
    pub id: String,
    pub created_at: String,
    pub score: u32,
    pub total: usize,
    pub expanded: bool,
    pub show_answers: bool,
    /// Empty unless the entry is expanded.
    pub questions: Vec<HistoryQuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPageView {
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub entries: Vec<HistoryEntryView>,
}

#[derive(Debug, Serialize)]
pub struct LoginStatusView {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: String,
    pub value: bool,
}

#[derive(Debug, Serialize)]
pub struct DiscussResponse {
    pub thread_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
