use std::sync::Arc;

use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{ExamRecord, GradeResult, Question},
    repositories::{ExamRepository, FeedbackRepository},
};

/// Outcome of deleting an exam record together with its feedback companion.
/// Both halves are always attempted.
#[derive(Debug)]
pub struct PairDeletion {
    pub exam: AppResult<bool>,
    pub feedback: AppResult<bool>,
}

impl PairDeletion {
    /// Whether the exam document is gone from the store.
    pub fn exam_removed(&self) -> bool {
        self.exam.is_ok()
    }

    pub fn into_result(self, id: &str) -> AppResult<()> {
        match (self.exam, self.feedback) {
            (Ok(true), Ok(_)) => Ok(()),
            (Ok(false), Ok(_)) => Err(AppError::NotFound(format!("Exam record '{}' not found", id))),
            (Err(exam), Err(feedback)) => Err(AppError::DatabaseError(format!(
                "Could not delete exam record '{}' ({}) or its feedback ({})",
                id, exam, feedback
            ))),
            (Err(exam), Ok(_)) => Err(AppError::Reconciliation(format!(
                "Feedback for '{}' was deleted but the exam record was not: {}",
                id, exam
            ))),
            (Ok(_), Err(feedback)) => Err(AppError::Reconciliation(format!(
                "Exam record '{}' was deleted but its feedback was not: {}",
                id, feedback
            ))),
        }
    }
}

pub struct ExamRecordService {
    exams: Arc<dyn ExamRepository>,
    feedbacks: Arc<dyn FeedbackRepository>,
}

impl ExamRecordService {
    pub fn new(exams: Arc<dyn ExamRepository>, feedbacks: Arc<dyn FeedbackRepository>) -> Self {
        Self { exams, feedbacks }
    }

    /// Upserts the graded exam and its feedback companion. Re-saving the same
    /// session keeps the original creation time.
    pub async fn save_graded_exam(
        &self,
        user_id: &str,
        session_id: &Uuid,
        questions: &[Question],
        results: &[GradeResult],
    ) -> AppResult<ExamRecord> {
        let mut record = ExamRecord::from_graded(user_id, session_id, questions, results)?;

        if let Some(existing) = self.exams.find_by_id(user_id, &record.id).await? {
            record.created_at = existing.created_at;
        }

        let record = self.exams.upsert(record).await?;
        self.feedbacks.upsert(record.feedback_record()).await?;

        log::info!("Saved exam record {} for user {}", record.id, user_id);
        Ok(record)
    }

    /// The user's records, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<ExamRecord>> {
        let mut records = self.exams.list_by_user(user_id).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn delete_exam(&self, user_id: &str, id: &str) -> PairDeletion {
        let exam = self.exams.delete(user_id, id).await;
        let feedback = self.feedbacks.delete(user_id, id).await;

        if let Err(e) = &exam {
            log::error!("Failed to delete exam record {}: {}", id, e);
        }
        if let Err(e) = &feedback {
            log::error!("Failed to delete feedback {}: {}", id, e);
        }

        PairDeletion { exam, feedback }
    }
}
