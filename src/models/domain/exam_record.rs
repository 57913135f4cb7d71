use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{grade::GradeResult, question::Question},
};

/// Document id for the record that belongs to an exam session.
pub fn record_id_for_session(session_id: &Uuid) -> String {
    format!("exam_{}", session_id)
}

/// A graded exam as stored in the user's `exams` partition. Both maps are keyed
/// by the question index rendered as a decimal string, which is how document
/// stores key nested objects.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExamRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub exam_data: BTreeMap<String, Question>,
    #[serde(default)]
    pub feedback_data: BTreeMap<String, GradeResult>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ExamRecord {
    /// Builds a record from a graded session, rejecting result sets that do
    /// not cover exactly the exam's questions.
    pub fn from_graded(
        user_id: &str,
        session_id: &Uuid,
        questions: &[Question],
        results: &[GradeResult],
    ) -> AppResult<Self> {
        let exam_data: BTreeMap<String, Question> = questions
            .iter()
            .map(|q| (q.id.to_string(), q.clone()))
            .collect();
        let feedback_data: BTreeMap<String, GradeResult> = results
            .iter()
            .map(|r| (r.index.to_string(), r.clone()))
            .collect();

        if exam_data.len() != questions.len() || feedback_data.len() != results.len() {
            return Err(AppError::ValidationError(
                "Exam contains duplicate question indexes".to_string(),
            ));
        }

        let record = ExamRecord {
            id: record_id_for_session(session_id),
            user_id: user_id.to_string(),
            exam_data,
            feedback_data,
            created_at: Utc::now(),
            modified_at: Some(Utc::now()),
        };
        record.check_bijection()?;
        Ok(record)
    }

    pub fn check_bijection(&self) -> AppResult<()> {
        let questions: BTreeSet<&String> = self.exam_data.keys().collect();
        let grades: BTreeSet<&String> = self.feedback_data.keys().collect();

        if questions != grades {
            return Err(AppError::ValidationError(format!(
                "Exam record {} has {} questions but {} grade results with different indexes",
                self.id,
                questions.len(),
                grades.len()
            )));
        }
        Ok(())
    }

    /// Questions in numeric index order with their grade, if any.
    pub fn ordered_questions(&self) -> Vec<(u32, &Question, Option<&GradeResult>)> {
        let mut items: Vec<(u32, &Question, Option<&GradeResult>)> = self
            .exam_data
            .iter()
            .filter_map(|(key, question)| {
                key.parse::<u32>()
                    .ok()
                    .map(|index| (index, question, self.feedback_data.get(key)))
            })
            .collect();
        items.sort_by_key(|(index, _, _)| *index);
        items
    }

    pub fn feedback_record(&self) -> FeedbackRecord {
        FeedbackRecord {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            feedback_data: self.feedback_data.clone(),
            created_at: self.created_at,
        }
    }
}

/// Companion document in the `feedbacks` partition; shares the exam record's id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub feedback_data: BTreeMap<String, GradeResult>,
    pub created_at: DateTime<Utc>,
}
