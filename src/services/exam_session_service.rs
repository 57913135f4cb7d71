use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    auth::Session,
    errors::{AppError, AppResult},
    models::domain::{
        exam_record::record_id_for_session, Answer, ExamPhase, Question, SessionSnapshot,
    },
    services::{
        grading_service::GradingService, record_service::ExamRecordService,
        snapshot_store::SnapshotStore,
    },
};

/// Result of a successful submission.
#[derive(Clone, Debug, Serialize)]
pub struct SubmitOutcome {
    pub score: u32,
    pub total: usize,
    pub record_id: String,
    /// `false` when grading succeeded but the record could not be stored.
    pub persisted: bool,
}

/// Owns the active exam and keeps the snapshot store in step with it. Every
/// change is written to the store before it becomes visible.
pub struct ExamSessionService {
    snapshot: Mutex<SessionSnapshot>,
    store: Arc<dyn SnapshotStore>,
    grading: GradingService,
    records: Arc<ExamRecordService>,
}

impl ExamSessionService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        grading: GradingService,
        records: Arc<ExamRecordService>,
    ) -> Self {
        Self {
            snapshot: Mutex::new(SessionSnapshot::default()),
            store,
            grading,
            records,
        }
    }

    /// Reloads the exam from the snapshot store.
    pub async fn restore(&self) -> AppResult<SessionSnapshot> {
        let restored = self.store.load().await?;
        log::info!("Restored exam session in phase {:?}", restored.phase);

        let mut guard = self.snapshot.lock().await;
        *guard = restored.clone();
        Ok(restored)
    }

    pub async fn view(&self) -> SessionSnapshot {
        self.snapshot.lock().await.clone()
    }

    pub async fn ensure_idle(&self) -> AppResult<()> {
        let phase = self.snapshot.lock().await.phase;
        if phase != ExamPhase::Idle {
            return Err(AppError::InvalidState(
                "Reset the current exam before uploading a new file".to_string(),
            ));
        }
        Ok(())
    }

    /// `Idle → Filling` with freshly generated questions.
    pub async fn load_exam(&self, questions: Vec<Question>) -> AppResult<SessionSnapshot> {
        let mut guard = self.snapshot.lock().await;
        if guard.phase != ExamPhase::Idle {
            return Err(AppError::InvalidState(
                "An exam is already in progress".to_string(),
            ));
        }

        let next = SessionSnapshot::with_exam(questions)?;
        self.store.save(&next).await?;
        *guard = next.clone();

        log::info!("Loaded exam with {} questions", next.questions().len());
        Ok(next)
    }

    pub async fn record_answer(&self, question_id: u32, answer: Answer) -> AppResult<SessionSnapshot> {
        let mut guard = self.snapshot.lock().await;
        let mut next = guard.clone();
        next.record_answer(question_id, answer)?;

        self.store.save(&next).await?;
        *guard = next.clone();
        Ok(next)
    }

    pub async fn toggle_explanations(&self) -> AppResult<SessionSnapshot> {
        let mut guard = self.snapshot.lock().await;
        let mut next = guard.clone();
        next.toggle_explanations()?;

        self.store.save(&next).await?;
        *guard = next.clone();
        Ok(next)
    }

    /// Validates, grades and records the exam. The lock is not held while
    /// the grading call is in flight; a reset during that window wins, and the
    /// reply is discarded unless the same submission is still pending.
    pub async fn submit(&self, session: &Session) -> AppResult<SubmitOutcome> {
        let package = {
            let mut guard = self.snapshot.lock().await;
            let mut next = guard.clone();
            let package = next.begin_submission()?;
            self.store.save(&next).await?;
            *guard = next;
            package
        };

        log::info!("Submitting {} answers for grading", package.answers.len());

        let results = match self.grading.grade(&package, session.bearer()).await {
            Ok(results) => results,
            Err(e) => {
                log::error!("Grading failed, exam stays submitted: {}", e);
                return Err(e);
            }
        };

        let (graded, session_id) = {
            let mut guard = self.snapshot.lock().await;
            if !guard.awaits_submission(package.submission_id) {
                log::warn!("Discarding grades for superseded submission {}", package.submission_id);
                return Err(AppError::InvalidState(
                    "The exam was reset while grading was in progress".to_string(),
                ));
            }

            let mut next = guard.clone();
            next.apply_grades(results)?;
            let session_id = next.ensure_session_id();
            self.store.save(&next).await?;
            *guard = next.clone();
            (next, session_id)
        };

        let record_id = record_id_for_session(&session_id);

        let persisted = match self
            .records
            .save_graded_exam(
                &session.user_id,
                &session_id,
                graded.questions(),
                &graded.ordered_results(),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                log::error!("Graded exam {} could not be stored: {}", record_id, e);
                false
            }
        };

        Ok(SubmitOutcome {
            score: graded.score.unwrap_or_default(),
            total: graded.questions().len(),
            record_id,
            persisted,
        })
    }

    /// Back to `Idle`, from any phase.
    pub async fn reset(&self) -> AppResult<SessionSnapshot> {
        let mut guard = self.snapshot.lock().await;
        self.store.clear().await?;
        *guard = self.store.load().await?;

        log::info!("Exam session reset");
        Ok(guard.clone())
    }

    /// The question and the user's answer for a discussion prompt.
    pub async fn discussion_subject(&self, question_id: u32) -> AppResult<(Question, Option<Answer>)> {
        let guard = self.snapshot.lock().await;
        if guard.phase != ExamPhase::Graded {
            return Err(AppError::InvalidState(
                "Questions can be discussed after grading".to_string(),
            ));
        }

        let question = guard.question(question_id)?.clone();
        let answer = guard.answers.get(&question_id).cloned();
        Ok((question, answer))
    }
}
