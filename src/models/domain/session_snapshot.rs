use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        grade::{self, GradeResult},
        question::{Answer, Question, QuestionKind},
    },
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamPhase {
    #[default]
    Idle,
    Filling,
    Submitting,
    Graded,
}

/// Everything the exam page needs to survive a reload. This is the only value
/// written to local storage; `SnapshotStore` is its persistence boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub version: u32,
    pub exam_data: Option<Vec<Question>>,
    pub answers: BTreeMap<u32, Answer>,
    pub phase: ExamPhase,
    pub results: BTreeMap<u32, GradeResult>,
    pub score: Option<u32>,
    pub show_explanations: bool,
    pub session_id: Option<Uuid>,
    /// Issued by each `Filling → Submitting` transition; a grading reply only
    /// applies to the submission that carries the same token.
    pub submission_id: Option<Uuid>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exam_data: None,
            answers: BTreeMap::new(),
            phase: ExamPhase::Idle,
            results: BTreeMap::new(),
            score: None,
            show_explanations: false,
            session_id: None,
            submission_id: None,
        }
    }
}

/// Questions and answers frozen at submit time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPackage {
    pub submission_id: Uuid,
    pub questions: Vec<Question>,
    pub answers: BTreeMap<u32, Answer>,
}

impl SessionSnapshot {
    /// Fresh `Filling` snapshot for newly generated questions.
    pub fn with_exam(questions: Vec<Question>) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(AppError::ValidationError(
                "Generated exam contains no questions".to_string(),
            ));
        }

        Ok(Self {
            exam_data: Some(questions),
            phase: ExamPhase::Filling,
            ..Self::default()
        })
    }

    pub fn questions(&self) -> &[Question] {
        self.exam_data.as_deref().unwrap_or_default()
    }

    pub fn question(&self, question_id: u32) -> AppResult<&Question> {
        self.questions()
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))
    }

    pub fn can_submit(&self) -> bool {
        self.phase == ExamPhase::Filling
    }

    pub fn record_answer(&mut self, question_id: u32, answer: Answer) -> AppResult<()> {
        if self.phase != ExamPhase::Filling {
            return Err(AppError::InvalidState(format!(
                "Answers are read-only while the exam is {:?}",
                self.phase
            )));
        }

        let question = self.question(question_id)?;
        match (&answer, question.kind) {
            (Answer::Choice(position), QuestionKind::Choice) => {
                if *position >= question.choices.len() {
                    return Err(AppError::ValidationError(format!(
                        "Question {} has {} choices, position {} is out of range",
                        question_id + 1,
                        question.choices.len(),
                        position
                    )));
                }
            }
            (Answer::Text(_), QuestionKind::FreeText) => {}
            (_, kind) => {
                return Err(AppError::ValidationError(format!(
                    "Question {} expects a {} answer",
                    question_id + 1,
                    kind
                )));
            }
        }

        self.answers.insert(question_id, answer);
        Ok(())
    }

    /// Ids of questions with no usable answer, in ascending order.
    pub fn missing_answers(&self) -> Vec<u32> {
        self.questions()
            .iter()
            .filter(|q| self.answers.get(&q.id).map_or(true, Answer::is_blank))
            .map(|q| q.id)
            .collect()
    }

    /// `Filling → Submitting`. Leaves the phase untouched when answers are missing.
    pub fn begin_submission(&mut self) -> AppResult<SubmissionPackage> {
        if self.phase != ExamPhase::Filling {
            return Err(AppError::InvalidState(format!(
                "Cannot submit while the exam is {:?}",
                self.phase
            )));
        }

        let missing = self.missing_answers();
        if !missing.is_empty() {
            return Err(AppError::MissingAnswers(missing));
        }

        let submission_id = Uuid::new_v4();
        self.phase = ExamPhase::Submitting;
        self.submission_id = Some(submission_id);
        Ok(SubmissionPackage {
            submission_id,
            questions: self.questions().to_vec(),
            answers: self.answers.clone(),
        })
    }

    /// Whether a grading reply for `submission_id` still belongs to this exam.
    pub fn awaits_submission(&self, submission_id: Uuid) -> bool {
        self.phase == ExamPhase::Submitting && self.submission_id == Some(submission_id)
    }

    /// `Submitting → Graded`. Returns the score. Every question must be graded
    /// exactly once.
    pub fn apply_grades(&mut self, results: Vec<GradeResult>) -> AppResult<u32> {
        if self.phase != ExamPhase::Submitting {
            return Err(AppError::InvalidState(format!(
                "Cannot record grades while the exam is {:?}",
                self.phase
            )));
        }

        let expected: BTreeSet<u32> = self.questions().iter().map(|q| q.id).collect();
        let graded: BTreeSet<u32> = results.iter().map(|r| r.index).collect();
        if graded != expected || results.len() != expected.len() {
            return Err(AppError::InvalidState(
                "Grades do not match the questions of the current exam".to_string(),
            ));
        }

        let score = grade::score(&results);
        self.results = results.into_iter().map(|r| (r.index, r)).collect();
        self.score = Some(score);
        self.phase = ExamPhase::Graded;
        Ok(score)
    }

    pub fn toggle_explanations(&mut self) -> AppResult<bool> {
        if self.phase != ExamPhase::Graded {
            return Err(AppError::InvalidState(
                "Explanations are available after grading".to_string(),
            ));
        }
        self.show_explanations = !self.show_explanations;
        Ok(self.show_explanations)
    }

    /// The id correlating this exam with its stored record, generated on first use.
    pub fn ensure_session_id(&mut self) -> Uuid {
        *self.session_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn ordered_results(&self) -> Vec<GradeResult> {
        self.results.values().cloned().collect()
    }
}
