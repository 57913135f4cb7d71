use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    auth::Session,
    errors::{AppError, AppResult},
    models::{
        domain::{grade, ExamRecord, GradeResult},
        dto::response::{HistoryEntryView, HistoryPageView, HistoryQuestionView},
    },
    services::record_service::ExamRecordService,
};

pub const CORRECT_COLOR: &str = "#3f51b5";
pub const INCORRECT_COLOR: &str = "#d9534f";
pub const UNGRADED_COLOR: &str = "#333";

pub fn grade_color(result: Option<&GradeResult>) -> &'static str {
    match result {
        Some(r) if r.is_correct => CORRECT_COLOR,
        Some(_) => INCORRECT_COLOR,
        None => UNGRADED_COLOR,
    }
}

/// `Mar 4, 2025, 9:05 PM`
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// An empty list still has one (empty) page.
pub fn total_pages(total_records: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_records.div_ceil(page_size).max(1)
}

/// In-memory history for one signed-in user.
#[derive(Debug, Default)]
pub struct HistoryBrowser {
    owner: String,
    records: Vec<ExamRecord>,
    expanded: Option<String>,
    answers_visible: HashSet<String>,
}

impl HistoryBrowser {
    pub fn new(owner: &str, records: Vec<ExamRecord>) -> Self {
        Self {
            owner: owner.to_string(),
            records,
            ..Self::default()
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn ensure_listed(&self, id: &str) -> AppResult<()> {
        if self.records.iter().any(|r| r.id == id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Exam record '{}' not found", id)))
        }
    }

    /// Expands `id`, collapsing any other record. Returns whether `id` is
    /// expanded afterwards.
    pub fn toggle_expanded(&mut self, id: &str) -> AppResult<bool> {
        self.ensure_listed(id)?;
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
            Ok(false)
        } else {
            self.expanded = Some(id.to_string());
            Ok(true)
        }
    }

    pub fn toggle_answers(&mut self, id: &str) -> AppResult<bool> {
        self.ensure_listed(id)?;
        if self.answers_visible.remove(id) {
            Ok(false)
        } else {
            self.answers_visible.insert(id.to_string());
            Ok(true)
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.records.retain(|r| r.id != id);
        self.answers_visible.remove(id);
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        }
    }

    /// Renders a 1-based page, clamped to the last page.
    pub fn page(&self, page: usize, page_size: usize) -> HistoryPageView {
        let page_size = page_size.max(1);
        let total_pages = total_pages(self.records.len(), page_size);
        let page = page.clamp(1, total_pages);

        let entries = self
            .records
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|record| self.entry(record))
            .collect();

        HistoryPageView {
            page,
            total_pages,
            total_records: self.records.len(),
            entries,
        }
    }

    fn entry(&self, record: &ExamRecord) -> HistoryEntryView {
        let expanded = self.expanded.as_deref() == Some(record.id.as_str());
        let show_answers = self.answers_visible.contains(&record.id);
        let results: Vec<GradeResult> = record.feedback_data.values().cloned().collect();

        let questions = if expanded {
            record
                .ordered_questions()
                .into_iter()
                .map(|(index, question, result)| HistoryQuestionView {
                    number: index + 1,
                    prompt: question.prompt.clone(),
                    choices: question.choices.clone(),
                    color: grade_color(result),
                    correctness: result.map(GradeResult::correctness),
                    feedback: result.and_then(|r| r.feedback.clone()),
                    correct_answer: show_answers.then(|| question.correct_answer.to_string()),
                    explanation: show_answers.then(|| question.explanation.clone()),
                })
                .collect()
        } else {
            Vec::new()
        };

        HistoryEntryView {
            id: record.id.clone(),
            created_at: format_created_at(&record.created_at),
            score: grade::score(&results),
            total: record.exam_data.len(),
            expanded,
            show_answers,
            questions,
        }
    }
}

/// Serves the checklist page. History is loaded once per signed-in user and
/// kept in memory until reloaded or signed out.
pub struct HistoryService {
    records: Arc<ExamRecordService>,
    page_size: usize,
    browser: Mutex<Option<HistoryBrowser>>,
}

impl HistoryService {
    pub fn new(records: Arc<ExamRecordService>, page_size: usize) -> Self {
        Self {
            records,
            page_size,
            browser: Mutex::new(None),
        }
    }

    async fn load(&self, session: &Session) -> AppResult<HistoryBrowser> {
        let records = self.records.list_for_user(&session.user_id).await?;
        log::info!("Loaded {} exam records for {}", records.len(), session.user_id);
        Ok(HistoryBrowser::new(&session.user_id, records))
    }

    async fn with_browser<T>(
        &self,
        session: &Session,
        f: impl FnOnce(&mut HistoryBrowser) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut guard = self.browser.lock().await;
        let stale = guard
            .as_ref()
            .map_or(true, |b| b.owner() != session.user_id);
        if stale {
            *guard = Some(self.load(session).await?);
        }

        match guard.as_mut() {
            Some(browser) => f(browser),
            None => Err(AppError::InternalError("History is not loaded".to_string())),
        }
    }

    pub async fn page(&self, session: &Session, page: usize) -> AppResult<HistoryPageView> {
        let page_size = self.page_size;
        self.with_browser(session, |b| Ok(b.page(page, page_size))).await
    }

    pub async fn reload(&self, session: &Session) -> AppResult<HistoryPageView> {
        let browser = self.load(session).await?;
        let view = browser.page(1, self.page_size);
        *self.browser.lock().await = Some(browser);
        Ok(view)
    }

    pub async fn toggle_expanded(&self, session: &Session, id: &str) -> AppResult<bool> {
        self.with_browser(session, |b| b.toggle_expanded(id)).await
    }

    pub async fn toggle_answers(&self, session: &Session, id: &str) -> AppResult<bool> {
        self.with_browser(session, |b| b.toggle_answers(id)).await
    }

    /// Deletes the record and its feedback. The record leaves the list as soon
    /// as the exam document is gone, even if the feedback delete failed.
    pub async fn delete(&self, session: &Session, id: &str) -> AppResult<()> {
        self.with_browser(session, |b| b.ensure_listed(id)).await?;

        let deletion = self.records.delete_exam(&session.user_id, id).await;
        if deletion.exam_removed() {
            if let Some(browser) = self.browser.lock().await.as_mut() {
                browser.remove(id);
            }
        }

        deletion.into_result(id)
    }

    pub async fn clear(&self) {
        *self.browser.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockExamRepository, MockFeedbackRepository};
    use crate::test_utils::fixtures::{graded_results, sample_questions, test_session};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn record(id: &str, minutes_ago: i64) -> ExamRecord {
        let questions = sample_questions();
        let results = graded_results(&questions, &[true, false, true]);
        let mut record =
            ExamRecord::from_graded("uid-test", &Uuid::new_v4(), &questions, &results).unwrap();
        record.id = id.to_string();
        record.created_at = Utc::now() - Duration::minutes(minutes_ago);
        record
    }

    fn records(count: usize) -> Vec<ExamRecord> {
        (0..count).map(|i| record(&format!("exam_{}", i), i as i64)).collect()
    }

    #[test]
    fn colors_follow_grade() {
        let right = GradeResult::new(0, true, None);
        let wrong = GradeResult::new(0, false, None);
        assert_eq!(grade_color(Some(&right)), "#3f51b5");
        assert_eq!(grade_color(Some(&wrong)), "#d9534f");
        assert_eq!(grade_color(None), "#333");
    }

    #[test]
    fn dates_use_short_month_and_twelve_hour_clock() {
        let date = Utc.with_ymd_and_hms(2025, 3, 4, 21, 5, 0).unwrap();
        assert_eq!(format_created_at(&date), "Mar 4, 2025, 9:05 PM");
    }

    #[test]
    fn pages_are_one_based_and_clamped() {
        let browser = HistoryBrowser::new("uid-test", records(32));

        let first = browser.page(1, 15);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.entries.len(), 15);
        assert_eq!(first.entries[0].id, "exam_0");

        let last = browser.page(99, 15);
        assert_eq!(last.page, 3);
        assert_eq!(last.entries.len(), 2);

        let zero = browser.page(0, 15);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn empty_history_has_one_empty_page() {
        let view = HistoryBrowser::new("uid-test", vec![]).page(1, 15);
        assert_eq!(view.total_pages, 1);
        assert!(view.entries.is_empty());
    }

    #[test]
    fn only_one_record_is_expanded() {
        let mut browser = HistoryBrowser::new("uid-test", records(3));

        assert!(browser.toggle_expanded("exam_0").unwrap());
        assert!(browser.toggle_expanded("exam_1").unwrap());
        let view = browser.page(1, 15);
        assert!(!view.entries[0].expanded);
        assert!(view.entries[1].expanded);
        assert!(view.entries[0].questions.is_empty());
        assert_eq!(view.entries[1].questions.len(), 3);

        assert!(!browser.toggle_expanded("exam_1").unwrap());
        assert!(browser.toggle_expanded("missing").is_err());
    }

    #[test]
    fn expanded_entry_colors_questions_and_reveals_answers_on_toggle() {
        let mut browser = HistoryBrowser::new("uid-test", records(1));
        browser.toggle_expanded("exam_0").unwrap();

        let view = browser.page(1, 15);
        let entry = &view.entries[0];
        assert_eq!(entry.score, 2);
        assert_eq!(entry.total, 3);
        let colors: Vec<&str> = entry.questions.iter().map(|q| q.color).collect();
        assert_eq!(colors, vec![CORRECT_COLOR, INCORRECT_COLOR, CORRECT_COLOR]);
        assert!(entry.questions[0].correct_answer.is_none());

        assert!(browser.toggle_answers("exam_0").unwrap());
        let view = browser.page(1, 15);
        assert_eq!(view.entries[0].questions[1].correct_answer.as_deref(), Some("Chlorophyll"));
    }

    #[tokio::test]
    async fn history_reloads_when_user_changes() {
        let mut exams = MockExamRepository::new();
        exams
            .expect_list_by_user()
            .times(2)
            .returning(|user_id| Ok(if user_id == "uid-test" { records(2) } else { vec![] }));
        let service = HistoryService::new(
            Arc::new(ExamRecordService::new(Arc::new(exams), Arc::new(MockFeedbackRepository::new()))),
            15,
        );

        let mine = test_session("a@example.com");
        assert_eq!(service.page(&mine, 1).await.unwrap().total_records, 2);
        assert_eq!(service.page(&mine, 1).await.unwrap().total_records, 2);

        let mut other = test_session("b@example.com");
        other.user_id = "uid-other".to_string();
        assert_eq!(service.page(&other, 1).await.unwrap().total_records, 0);
    }

    #[tokio::test]
    async fn delete_keeps_list_when_exam_delete_fails() {
        let mut exams = MockExamRepository::new();
        exams.expect_list_by_user().returning(|_| Ok(records(2)));
        exams
            .expect_delete()
            .returning(|_, _| Err(AppError::DatabaseError("timeout".to_string())));
        let mut feedbacks = MockFeedbackRepository::new();
        feedbacks.expect_delete().returning(|_, _| Ok(true));
        let service = HistoryService::new(
            Arc::new(ExamRecordService::new(Arc::new(exams), Arc::new(feedbacks))),
            15,
        );

        let session = test_session("a@example.com");
        let result = service.delete(&session, "exam_0").await;
        assert!(matches!(result, Err(AppError::Reconciliation(_))));
        assert_eq!(service.page(&session, 1).await.unwrap().total_records, 2);
    }

    #[tokio::test]
    async fn delete_removes_record_when_exam_is_gone() {
        let mut exams = MockExamRepository::new();
        exams.expect_list_by_user().times(1).returning(|_| Ok(records(2)));
        exams.expect_delete().returning(|_, _| Ok(true));
        let mut feedbacks = MockFeedbackRepository::new();
        feedbacks
            .expect_delete()
            .returning(|_, _| Err(AppError::DatabaseError("timeout".to_string())));
        let service = HistoryService::new(
            Arc::new(ExamRecordService::new(Arc::new(exams), Arc::new(feedbacks))),
            15,
        );

        let session = test_session("a@example.com");
        let result = service.delete(&session, "exam_1").await;
        assert!(matches!(result, Err(AppError::Reconciliation(_))));

        let view = service.page(&session, 1).await.unwrap();
        assert_eq!(view.total_records, 1);
        assert_eq!(view.entries[0].id, "exam_0");
    }
}
